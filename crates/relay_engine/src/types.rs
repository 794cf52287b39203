use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub type JobTicket = u64;

/// Which scheduled wait has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Grace,
    PollInterval,
}

#[derive(Debug)]
pub enum EngineEvent {
    Submitted {
        ticket: JobTicket,
        result: Result<SubmitReply, ClientError>,
    },
    Polled {
        ticket: JobTicket,
        result: Result<PollReply, ClientError>,
    },
    TimerFired {
        ticket: JobTicket,
        timer: Timer,
    },
}

/// Reply to a submission. `job_id` is `None` when the processor sent none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReply {
    pub job_id: Option<String>,
}

impl SubmitReply {
    pub(crate) fn from_json(value: &Value) -> Self {
        let job_id = match value.get("jobId") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Self { job_id }
    }
}

/// Reply to one poll call.
#[derive(Debug, Clone, PartialEq)]
pub struct PollReply {
    pub status: Option<String>,
    pub result: Option<String>,
    pub raw: Value,
}

impl PollReply {
    pub(crate) fn from_json(value: Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(ToOwned::to_owned);
        let status = text("status");
        let result = text("brief").or_else(|| text("result"));
        Self {
            status,
            result,
            raw: value,
        }
    }

    /// Two-space indented dump of the raw response.
    pub fn pretty_raw(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClientError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}

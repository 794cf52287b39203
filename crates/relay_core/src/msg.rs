use crate::{JobTicket, Wake};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the input box.
    SubmitRequested(String),
    /// User asked for a fresh transcript.
    NewSessionRequested,
    /// Submission call returned; `job_id` is whatever the processor sent.
    SubmitCompleted {
        ticket: JobTicket,
        job_id: Option<String>,
    },
    /// Submission call could not be completed.
    SubmitFailed { ticket: JobTicket, message: String },
    PollCompleted {
        ticket: JobTicket,
        report: PollReport,
    },
    /// Poll tick could not be completed (network, HTTP status, decoding).
    PollFailed { ticket: JobTicket, message: String },
    /// A scheduled wait has elapsed.
    Woke { ticket: JobTicket, wake: Wake },
    /// Changes nothing; lets the boundary run one pass of its loop, e.g. to
    /// notice that input has closed.
    NoOp,
}

/// Decoded reply to one poll call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollReport {
    pub status: Option<String>,
    pub result: Option<String>,
    /// Pretty-printed raw response, shown when `result` is missing.
    pub raw: String,
}

impl PollReport {
    pub fn is_done(&self) -> bool {
        self.status.as_deref() == Some(crate::DONE_STATUS)
    }

    /// Text for the transcript once the job is done.
    pub fn display_text(&self) -> &str {
        match self.result.as_deref() {
            Some(result) if !result.is_empty() => result,
            _ => &self.raw,
        }
    }
}

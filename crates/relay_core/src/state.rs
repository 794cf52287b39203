use std::fmt;
use std::time::Duration;

use crate::notice::timeout_notice;
use crate::transcript::{Message, Transcript};
use crate::view_model::SessionView;

/// Poll status reported by the processor once a job has finished.
pub const DONE_STATUS: &str = "done";

/// Sequence number of an accepted submission. Replies carrying any other
/// ticket than the active job's are stale and ignored.
pub type JobTicket = u64;

/// Identifier handed out by the remote processor. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Returns `None` for empty or whitespace-only identifiers. Anything
    /// else is kept verbatim, surrounding whitespace included.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Timing budget for one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub grace_delay: Duration,
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            grace_delay: Duration::from_millis(1500),
            poll_interval: Duration::from_secs(10),
            max_attempts: 60,
        }
    }
}

impl PollPolicy {
    /// Nominal elapsed time after `attempt` unsuccessful polls. Tick based,
    /// so real time runs slightly longer under scheduling jitter.
    pub fn elapsed(&self, attempt: u32) -> Duration {
        self.poll_interval * attempt
    }

    pub fn budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    SubmissionFailed,
    PollFailed,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::SubmissionFailed => write!(f, "submission failed"),
            FailureReason::PollFailed => write!(f, "poll failed"),
        }
    }
}

/// Terminal result of the previous job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    TimedOut,
    Failed(FailureReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ActiveJob {
    pub(crate) ticket: JobTicket,
    pub(crate) id: JobId,
    pub(crate) attempt: u32,
}

/// The orchestrator's single job slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum Phase {
    #[default]
    Idle,
    Submitting {
        ticket: JobTicket,
    },
    AwaitingGraceDelay {
        job: ActiveJob,
    },
    Polling {
        job: ActiveJob,
    },
}

/// Data-free mirror of the current phase, for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseKind {
    #[default]
    Idle,
    Submitting,
    AwaitingGraceDelay,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    transcript: Transcript,
    phase: Phase,
    policy: PollPolicy,
    next_ticket: JobTicket,
    status_line: String,
    last_outcome: Option<JobOutcome>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            busy: self.is_busy(),
            phase: self.phase_kind(),
            status_line: self.status_line.clone(),
            transcript: self.transcript.messages().to_vec(),
            last_outcome: self.last_outcome,
            dirty: self.dirty,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn phase_kind(&self) -> PhaseKind {
        match self.phase {
            Phase::Idle => PhaseKind::Idle,
            Phase::Submitting { .. } => PhaseKind::Submitting,
            Phase::AwaitingGraceDelay { .. } => PhaseKind::AwaitingGraceDelay,
            Phase::Polling { .. } => PhaseKind::Polling,
        }
    }

    /// Ticket of the job currently in flight, if any.
    pub fn active_ticket(&self) -> Option<JobTicket> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Submitting { ticket } => Some(*ticket),
            Phase::AwaitingGraceDelay { job } | Phase::Polling { job } => Some(job.ticket),
        }
    }

    /// Unsuccessful polls so far for the active job; 0 when none is polling.
    pub fn attempt(&self) -> u32 {
        match &self.phase {
            Phase::AwaitingGraceDelay { job } | Phase::Polling { job } => job.attempt,
            Phase::Idle | Phase::Submitting { .. } => 0,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn last_outcome(&self) -> Option<JobOutcome> {
        self.last_outcome
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Returns whether anything observable changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn phase(&self) -> &Phase {
        &self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.dirty = true;
    }

    /// Locks the session for a new job and records the two opening entries.
    pub(crate) fn begin_job(&mut self, input: &str, placeholder: &str) -> JobTicket {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.phase = Phase::Submitting { ticket };
        self.transcript.append(Message::user(input));
        self.transcript.append(Message::system(placeholder));
        self.status_line = placeholder.to_string();
        self.dirty = true;
        ticket
    }

    pub(crate) fn replace_placeholder(&mut self, text: impl Into<String>) {
        self.transcript.replace_last(Message::system(text));
        self.dirty = true;
    }

    pub(crate) fn set_status_line(&mut self, text: impl Into<String>) {
        self.status_line = text.into();
        self.dirty = true;
    }

    /// Terminal step shared by every outcome: unlock and forget the job.
    pub(crate) fn finish_job(&mut self, outcome: JobOutcome) {
        self.phase = Phase::Idle;
        self.status_line.clear();
        self.last_outcome = Some(outcome);
        self.dirty = true;
    }

    pub(crate) fn timeout_text(&self) -> String {
        timeout_notice(self.policy.budget())
    }

    pub(crate) fn reset_session(&mut self) {
        self.transcript.clear();
        self.status_line.clear();
        self.last_outcome = None;
        self.dirty = true;
    }
}

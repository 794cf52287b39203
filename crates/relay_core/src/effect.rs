use std::time::Duration;

use crate::{JobId, JobTicket, Notice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a transient notice at the boundary.
    Notify(Notice),
    Submit { ticket: JobTicket, input: String },
    Poll { ticket: JobTicket, job_id: JobId },
    /// Deliver `Msg::Woke { ticket, wake }` after `delay`.
    Wait {
        ticket: JobTicket,
        delay: Duration,
        wake: Wake,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    GraceElapsed,
    PollDue,
}

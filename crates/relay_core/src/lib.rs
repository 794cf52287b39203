//! Relay core: transcript store and the pure job orchestrator state machine.
mod effect;
mod msg;
mod notice;
mod state;
mod transcript;
mod update;
mod view_model;

pub use effect::{Effect, Wake};
pub use msg::{Msg, PollReport};
pub use notice::{
    timeout_notice, working_status, Notice, POLL_FAILED_TEXT, SUBMISSION_FAILED_TEXT,
    SUBMITTING_TEXT,
};
pub use state::{
    FailureReason, JobId, JobOutcome, JobTicket, PhaseKind, PollPolicy, SessionState,
    DONE_STATUS,
};
pub use transcript::{Message, Origin, Transcript};
pub use update::update;
pub use view_model::SessionView;

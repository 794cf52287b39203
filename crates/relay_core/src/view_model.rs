use crate::{JobOutcome, Message, PhaseKind};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub busy: bool,
    pub phase: PhaseKind,
    pub status_line: String,
    pub transcript: Vec<Message>,
    pub last_outcome: Option<JobOutcome>,
    pub dirty: bool,
}

//! Relay engine: remote job client and effect execution.
mod client;
mod engine;
mod types;

pub use client::{ClientSettings, JobClient, ReqwestJobClient};
pub use engine::{ChannelEventSink, EngineHandle, EventSink};
pub use types::{
    ClientError, EngineEvent, FailureKind, JobTicket, PollReply, SubmitReply, Timer,
};

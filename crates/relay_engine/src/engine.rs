use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use relay_logging::{relay_debug, relay_warn};
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, JobClient, JobTicket, Timer};

/// Receives engine events, possibly from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Submit {
        ticket: JobTicket,
        input: String,
    },
    Poll {
        ticket: JobTicket,
        job_id: String,
    },
    Wait {
        ticket: JobTicket,
        delay: Duration,
        timer: Timer,
    },
}

/// Runs client calls and timers on a background tokio runtime.
///
/// Every command completes with exactly one event on the sink unless the
/// engine is shut down first.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(client: Arc<dyn JobClient>, sink: Arc<dyn EventSink>) -> io::Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let client = client.clone();
                let sink = sink.clone();
                let cancel = worker_cancel.clone();
                runtime.spawn(async move {
                    handle_command(client.as_ref(), command, sink.as_ref(), cancel).await;
                });
            }
        });

        Ok(Self { cmd_tx, cancel })
    }

    pub fn submit(&self, ticket: JobTicket, input: impl Into<String>) {
        self.send(EngineCommand::Submit {
            ticket,
            input: input.into(),
        });
    }

    pub fn poll(&self, ticket: JobTicket, job_id: impl Into<String>) {
        self.send(EngineCommand::Poll {
            ticket,
            job_id: job_id.into(),
        });
    }

    pub fn wait(&self, ticket: JobTicket, delay: Duration, timer: Timer) {
        self.send(EngineCommand::Wait {
            ticket,
            delay,
            timer,
        });
    }

    /// Cancels in-flight calls and pending timers; later commands are dropped.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn send(&self, command: EngineCommand) {
        if self.cancel.is_cancelled() {
            relay_debug!("Engine shut down; dropping command");
            return;
        }
        if self.cmd_tx.send(command).is_err() {
            relay_warn!("Engine worker is gone; dropping command");
        }
    }
}

async fn handle_command(
    client: &dyn JobClient,
    command: EngineCommand,
    sink: &dyn EventSink,
    cancel: CancellationToken,
) {
    match command {
        EngineCommand::Submit { ticket, input } => {
            tokio::select! {
                result = client.submit(&input) => {
                    if let Err(err) = &result {
                        relay_warn!("Submit for job {} failed: {}", ticket, err);
                    }
                    sink.emit(EngineEvent::Submitted { ticket, result });
                }
                _ = cancel.cancelled() => relay_debug!("Submit for job {} cancelled", ticket),
            }
        }
        EngineCommand::Poll { ticket, job_id } => {
            tokio::select! {
                result = client.poll(&job_id) => {
                    if let Err(err) = &result {
                        relay_warn!("Poll for job {} ({}) failed: {}", ticket, job_id, err);
                    }
                    sink.emit(EngineEvent::Polled { ticket, result });
                }
                _ = cancel.cancelled() => relay_debug!("Poll for job {} cancelled", ticket),
            }
        }
        EngineCommand::Wait {
            ticket,
            delay,
            timer,
        } => {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    sink.emit(EngineEvent::TimerFired { ticket, timer });
                }
                _ = cancel.cancelled() => relay_debug!("{:?} timer for job {} cancelled", timer, ticket),
            }
        }
    }
}

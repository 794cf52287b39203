use std::io;
use std::sync::{mpsc, Arc};

use relay_core::{Effect, Msg, Notice, PollReport, Wake};
use relay_engine::{EngineEvent, EngineHandle, EventSink, JobClient, Timer};

use super::app::Inbox;

/// Executes core effects on the engine and routes engine events back into
/// the app inbox as core messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub(crate) fn new(client: Arc<dyn JobClient>, inbox: mpsc::Sender<Inbox>) -> io::Result<Self> {
        let engine = EngineHandle::new(client, Arc::new(InboxSink { tx: inbox }))?;
        Ok(Self { engine })
    }

    /// Starts every IO effect and returns the notices meant for the user.
    pub(crate) fn run(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Notify(notice) => notices.push(notice),
                Effect::Submit { ticket, input } => self.engine.submit(ticket, input),
                Effect::Poll { ticket, job_id } => self.engine.poll(ticket, job_id.as_str()),
                Effect::Wait {
                    ticket,
                    delay,
                    wake,
                } => self.engine.wait(ticket, delay, map_wake(wake)),
            }
        }
        notices
    }

    pub(crate) fn shutdown(&self) {
        self.engine.shutdown();
    }
}

struct InboxSink {
    tx: mpsc::Sender<Inbox>,
}

impl EventSink for InboxSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(Inbox::Msg(map_event(event)));
    }
}

fn map_wake(wake: Wake) -> Timer {
    match wake {
        Wake::GraceElapsed => Timer::Grace,
        Wake::PollDue => Timer::PollInterval,
    }
}

fn map_timer(timer: Timer) -> Wake {
    match timer {
        Timer::Grace => Wake::GraceElapsed,
        Timer::PollInterval => Wake::PollDue,
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { ticket, result } => match result {
            Ok(reply) => Msg::SubmitCompleted {
                ticket,
                job_id: reply.job_id,
            },
            Err(err) => Msg::SubmitFailed {
                ticket,
                message: err.to_string(),
            },
        },
        EngineEvent::Polled { ticket, result } => match result {
            Ok(reply) => Msg::PollCompleted {
                ticket,
                report: PollReport {
                    raw: reply.pretty_raw(),
                    status: reply.status,
                    result: reply.result,
                },
            },
            Err(err) => Msg::PollFailed {
                ticket,
                message: err.to_string(),
            },
        },
        EngineEvent::TimerFired { ticket, timer } => Msg::Woke {
            ticket,
            wake: map_timer(timer),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use relay_core::{update, JobOutcome, Message, PollPolicy, SessionState};
    use relay_engine::{ClientError, PollReply, SubmitReply};
    use serde_json::json;

    use super::*;

    /// Reports "working" for the first `working_polls` polls, then "done".
    struct ScriptedClient {
        job_id: Option<String>,
        working_polls: usize,
        polls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl JobClient for ScriptedClient {
        async fn submit(&self, _input: &str) -> Result<SubmitReply, ClientError> {
            Ok(SubmitReply {
                job_id: self.job_id.clone(),
            })
        }

        async fn poll(&self, _job_id: &str) -> Result<PollReply, ClientError> {
            let seen = self.polls.fetch_add(1, Ordering::SeqCst);
            let raw = if seen < self.working_polls {
                json!({"status": "working"})
            } else {
                json!({"status": "done", "brief": "ABC"})
            };
            Ok(PollReply {
                status: raw["status"].as_str().map(ToOwned::to_owned),
                result: raw.get("brief").and_then(|v| v.as_str()).map(ToOwned::to_owned),
                raw,
            })
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            grace_delay: Duration::from_millis(5),
            poll_interval: Duration::from_millis(5),
            max_attempts: 3,
        }
    }

    /// Runs one submission to its terminal state through the real engine.
    fn drive(client: ScriptedClient) -> SessionState {
        let (tx, rx) = mpsc::channel();
        let runner = EffectRunner::new(Arc::new(client), tx).unwrap();
        let (mut state, effects) = update(
            SessionState::with_policy(fast_policy()),
            Msg::SubmitRequested("idea".to_string()),
        );
        runner.run(effects);

        while state.is_busy() {
            let msg = match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Inbox::Msg(msg) => msg,
                other => panic!("unexpected inbox item {other:?}"),
            };
            let (next, effects) = update(state, msg);
            state = next;
            assert!(runner.run(effects).is_empty());
        }
        runner.shutdown();
        state
    }

    #[test]
    fn job_runs_to_completion() {
        let state = drive(ScriptedClient {
            job_id: Some("job-1".to_string()),
            working_polls: 2,
            polls: AtomicUsize::new(0),
        });

        assert_eq!(state.last_outcome(), Some(JobOutcome::Completed));
        assert_eq!(
            state.transcript().messages(),
            &[Message::user("idea"), Message::system("ABC")]
        );
    }

    #[test]
    fn job_times_out_after_budget() {
        let state = drive(ScriptedClient {
            job_id: Some("job-1".to_string()),
            working_polls: usize::MAX,
            polls: AtomicUsize::new(0),
        });

        assert_eq!(state.last_outcome(), Some(JobOutcome::TimedOut));
        assert!(state
            .transcript()
            .last()
            .is_some_and(|m| m.text.starts_with("Timed out")));
    }

    #[test]
    fn missing_job_id_never_polls() {
        let client = ScriptedClient {
            job_id: None,
            working_polls: 0,
            polls: AtomicUsize::new(0),
        };
        let state = drive(client);
        assert_eq!(
            state.last_outcome(),
            Some(JobOutcome::Failed(relay_core::FailureReason::SubmissionFailed))
        );
    }

    #[test]
    fn notify_effects_are_returned_not_executed() {
        let (tx, _rx) = mpsc::channel();
        let client = ScriptedClient {
            job_id: None,
            working_polls: 0,
            polls: AtomicUsize::new(0),
        };
        let runner = EffectRunner::new(Arc::new(client), tx).unwrap();
        let notices = runner.run(vec![Effect::Notify(Notice::EmptyInput)]);
        assert_eq!(notices, vec![Notice::EmptyInput]);
    }

    #[test]
    fn poll_errors_map_to_poll_failed() {
        let msg = map_event(EngineEvent::Polled {
            ticket: 4,
            result: Err(ClientError {
                kind: relay_engine::FailureKind::HttpStatus(502),
                message: "Bad Gateway".to_string(),
            }),
        });
        assert_eq!(
            msg,
            Msg::PollFailed {
                ticket: 4,
                message: "http status 502: Bad Gateway".to_string(),
            }
        );
    }
}

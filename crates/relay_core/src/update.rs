use relay_logging::{relay_debug, relay_info, relay_warn};

use crate::notice::{working_status, POLL_FAILED_TEXT, SUBMISSION_FAILED_TEXT, SUBMITTING_TEXT};
use crate::state::{ActiveJob, Phase};
use crate::{
    Effect, FailureReason, JobId, JobOutcome, JobTicket, Msg, Notice, PollReport, SessionState,
    Wake,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(raw) => submit_requested(&mut state, &raw),
        Msg::NewSessionRequested => {
            if state.is_busy() {
                relay_debug!("New session ignored while a job is active");
            } else {
                state.reset_session();
            }
            Vec::new()
        }
        Msg::SubmitCompleted { ticket, job_id } => {
            if !matches!(state.phase(), Phase::Submitting { ticket: t } if *t == ticket) {
                return stale(state, ticket);
            }
            match job_id.as_deref().and_then(JobId::parse) {
                Some(id) => {
                    relay_info!("Job {} accepted as {}", ticket, id);
                    state.set_phase(Phase::AwaitingGraceDelay {
                        job: ActiveJob {
                            ticket,
                            id,
                            attempt: 0,
                        },
                    });
                    vec![Effect::Wait {
                        ticket,
                        delay: state.policy().grace_delay,
                        wake: Wake::GraceElapsed,
                    }]
                }
                None => {
                    relay_warn!("Job {} submission returned no job id", ticket);
                    fail(&mut state, FailureReason::SubmissionFailed);
                    Vec::new()
                }
            }
        }
        Msg::SubmitFailed { ticket, message } => {
            if !matches!(state.phase(), Phase::Submitting { ticket: t } if *t == ticket) {
                return stale(state, ticket);
            }
            relay_warn!("Job {} submission failed: {}", ticket, message);
            fail(&mut state, FailureReason::SubmissionFailed);
            Vec::new()
        }
        Msg::Woke {
            ticket,
            wake: Wake::GraceElapsed,
        } => {
            let job = match state.phase() {
                Phase::AwaitingGraceDelay { job } if job.ticket == ticket => job.clone(),
                _ => return stale(state, ticket),
            };
            // Anticipates the first tick so the user sees progress right away.
            let status = working_status(state.policy().elapsed(1));
            state.replace_placeholder(status.clone());
            state.set_status_line(status);
            let job_id = job.id.clone();
            state.set_phase(Phase::Polling { job });
            vec![Effect::Poll { ticket, job_id }]
        }
        Msg::Woke {
            ticket,
            wake: Wake::PollDue,
        } => {
            let job = match state.phase() {
                Phase::Polling { job } if job.ticket == ticket => job.clone(),
                _ => return stale(state, ticket),
            };
            if job.attempt >= state.policy().max_attempts {
                relay_warn!("Job {} timed out after {} polls", ticket, job.attempt);
                let notice = state.timeout_text();
                state.replace_placeholder(notice);
                state.finish_job(JobOutcome::TimedOut);
                Vec::new()
            } else {
                vec![Effect::Poll {
                    ticket,
                    job_id: job.id,
                }]
            }
        }
        Msg::PollCompleted { ticket, report } => poll_completed(&mut state, ticket, report),
        Msg::PollFailed { ticket, message } => {
            if !matches!(state.phase(), Phase::Polling { job } if job.ticket == ticket) {
                return stale(state, ticket);
            }
            relay_warn!("Job {} poll failed: {}", ticket, message);
            fail(&mut state, FailureReason::PollFailed);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_requested(state: &mut SessionState, raw: &str) -> Vec<Effect> {
    let input = raw.trim();
    if input.is_empty() {
        relay_info!("Rejected empty submission");
        return vec![Effect::Notify(Notice::EmptyInput)];
    }
    if state.is_busy() {
        relay_debug!("Submission ignored while a job is active");
        return Vec::new();
    }

    let ticket = state.begin_job(input, SUBMITTING_TEXT);
    relay_info!("Job {} submitting ({} chars)", ticket, input.len());
    vec![Effect::Submit {
        ticket,
        input: input.to_string(),
    }]
}

fn poll_completed(state: &mut SessionState, ticket: JobTicket, report: PollReport) -> Vec<Effect> {
    let mut job = match state.phase() {
        Phase::Polling { job } if job.ticket == ticket => job.clone(),
        _ => {
            relay_debug!("Dropping stale poll reply for job {}", ticket);
            return Vec::new();
        }
    };

    if report.is_done() {
        relay_info!("Job {} completed after {} polls", ticket, job.attempt);
        state.replace_placeholder(report.display_text());
        state.finish_job(JobOutcome::Completed);
        return Vec::new();
    }

    // Any status other than "done" counts as still working.
    job.attempt += 1;
    let status = working_status(state.policy().elapsed(job.attempt));
    relay_debug!(
        "Job {} status {:?}, attempt {}",
        ticket,
        report.status,
        job.attempt
    );
    state.replace_placeholder(status.clone());
    state.set_status_line(status);
    state.set_phase(Phase::Polling { job });
    vec![Effect::Wait {
        ticket,
        delay: state.policy().poll_interval,
        wake: Wake::PollDue,
    }]
}

fn fail(state: &mut SessionState, reason: FailureReason) {
    let notice = match reason {
        FailureReason::SubmissionFailed => SUBMISSION_FAILED_TEXT,
        FailureReason::PollFailed => POLL_FAILED_TEXT,
    };
    state.replace_placeholder(notice);
    state.finish_job(JobOutcome::Failed(reason));
}

fn stale(state: SessionState, ticket: JobTicket) -> (SessionState, Vec<Effect>) {
    relay_debug!("Dropping stale reply for job {}", ticket);
    (state, Vec::new())
}

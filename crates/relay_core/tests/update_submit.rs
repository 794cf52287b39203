use std::sync::Once;

use pretty_assertions::assert_eq;
use relay_core::{
    update, Effect, FailureReason, JobOutcome, Message, Msg, Notice, Origin, PhaseKind,
    PollReport, SessionState, Wake, SUBMISSION_FAILED_TEXT, SUBMITTING_TEXT,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(relay_logging::initialize_for_tests);
}

fn submit(state: SessionState, input: &str) -> (SessionState, Vec<Effect>) {
    update(state, Msg::SubmitRequested(input.to_string()))
}

#[test]
fn submit_trims_and_opens_two_entries() {
    init_logging();
    let (mut state, effects) = submit(SessionState::new(), "  a coffee subscription  \n");

    assert_eq!(
        effects,
        vec![Effect::Submit {
            ticket: 1,
            input: "a coffee subscription".to_string(),
        }]
    );
    let view = state.view();
    assert!(view.busy);
    assert_eq!(view.phase, PhaseKind::Submitting);
    assert_eq!(view.status_line, SUBMITTING_TEXT);
    assert_eq!(
        view.transcript,
        vec![
            Message::user("a coffee subscription"),
            Message::system(SUBMITTING_TEXT),
        ]
    );
    assert!(state.consume_dirty());
}

#[test]
fn empty_input_is_rejected_with_notice() {
    init_logging();
    for input in ["", "   ", "\n\t "] {
        let mut before = SessionState::new();
        before.consume_dirty();
        let (mut next, effects) = submit(before.clone(), input);

        assert_eq!(effects, vec![Effect::Notify(Notice::EmptyInput)]);
        assert_eq!(next, before);
        assert!(!next.consume_dirty());
    }
}

#[test]
fn submit_while_busy_is_noop() {
    init_logging();
    let (mut state, _) = submit(SessionState::new(), "first");
    state.consume_dirty();
    let before = state.clone();

    let (mut next, effects) = submit(state, "second");

    assert!(effects.is_empty());
    assert_eq!(next, before);
    assert!(next.is_busy());
    assert!(!next.consume_dirty());
}

/// Returns a session parked at each suspension point of job ticket 1.
fn suspended_sessions() -> Vec<(PhaseKind, SessionState)> {
    let (submitting, _) = submit(SessionState::new(), "first");
    let (awaiting, _) = update(
        submitting.clone(),
        Msg::SubmitCompleted {
            ticket: 1,
            job_id: Some("job-1".to_string()),
        },
    );
    let (polling, _) = update(
        awaiting.clone(),
        Msg::Woke {
            ticket: 1,
            wake: Wake::GraceElapsed,
        },
    );
    let (between_ticks, _) = update(
        polling.clone(),
        Msg::PollCompleted {
            ticket: 1,
            report: PollReport {
                status: Some("working".to_string()),
                result: None,
                raw: String::new(),
            },
        },
    );
    vec![
        (PhaseKind::Submitting, submitting),
        (PhaseKind::AwaitingGraceDelay, awaiting),
        (PhaseKind::Polling, polling),
        (PhaseKind::Polling, between_ticks),
    ]
}

#[test]
fn submit_and_new_session_are_noops_at_every_suspension_point() {
    init_logging();
    for (phase, mut state) in suspended_sessions() {
        assert_eq!(state.phase_kind(), phase);
        state.consume_dirty();
        let before = state.clone();

        let (state, effects) = submit(state, "second");
        assert!(effects.is_empty(), "submit in {phase:?}");
        assert_eq!(state, before, "submit in {phase:?}");

        let (mut state, effects) = update(state, Msg::NewSessionRequested);
        assert!(effects.is_empty(), "new session in {phase:?}");
        assert_eq!(state, before, "new session in {phase:?}");
        assert!(state.is_busy());
        assert!(!state.consume_dirty());
    }
}

#[test]
fn job_id_is_polled_verbatim() {
    init_logging();
    let (state, _) = submit(SessionState::new(), "idea");
    let (state, _) = update(
        state,
        Msg::SubmitCompleted {
            ticket: 1,
            job_id: Some(" abc".to_string()),
        },
    );
    let (_, effects) = update(
        state,
        Msg::Woke {
            ticket: 1,
            wake: Wake::GraceElapsed,
        },
    );

    match effects.as_slice() {
        [Effect::Poll { job_id, .. }] => assert_eq!(job_id.as_str(), " abc"),
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn missing_job_id_fails_and_unlocks() {
    init_logging();
    for job_id in [None, Some(String::new()), Some("   ".to_string())] {
        let (state, _) = submit(SessionState::new(), "idea");
        let (state, effects) = update(state, Msg::SubmitCompleted { ticket: 1, job_id });

        assert!(effects.is_empty());
        assert!(!state.is_busy());
        assert_eq!(
            state.last_outcome(),
            Some(JobOutcome::Failed(FailureReason::SubmissionFailed))
        );
        assert_eq!(
            state.transcript().last(),
            Some(&Message::system(SUBMISSION_FAILED_TEXT))
        );
        assert_eq!(state.transcript().len(), 2);
        assert_eq!(state.status_line(), "");
    }
}

#[test]
fn submit_network_failure_fails_and_unlocks() {
    init_logging();
    let (state, _) = submit(SessionState::new(), "idea");
    let (state, effects) = update(
        state,
        Msg::SubmitFailed {
            ticket: 1,
            message: "connection refused".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert!(!state.is_busy());
    assert_eq!(
        state.transcript().last().map(|m| m.text.as_str()),
        Some(SUBMISSION_FAILED_TEXT)
    );
}

#[test]
fn accepted_submission_waits_for_grace_delay() {
    init_logging();
    let (state, _) = submit(SessionState::new(), "idea");
    let grace = state.policy().grace_delay;
    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            ticket: 1,
            job_id: Some("job-42".to_string()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::Wait {
            ticket: 1,
            delay: grace,
            wake: Wake::GraceElapsed,
        }]
    );
    assert_eq!(state.phase_kind(), PhaseKind::AwaitingGraceDelay);
    // Placeholder is untouched until the grace delay elapses.
    assert_eq!(
        state.transcript().last(),
        Some(&Message::system(SUBMITTING_TEXT))
    );
}

#[test]
fn stale_submission_reply_is_ignored() {
    init_logging();
    let (state, _) = submit(SessionState::new(), "idea");
    let (state, _) = update(
        state,
        Msg::SubmitCompleted {
            ticket: 1,
            job_id: None,
        },
    );
    let (state, _) = submit(state, "another idea");
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::SubmitCompleted {
            ticket: 1,
            job_id: Some("late".to_string()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert_eq!(state.active_ticket(), Some(2));
    let origins: Vec<_> = state.transcript().messages().iter().map(|m| m.origin).collect();
    assert_eq!(
        origins,
        vec![Origin::User, Origin::System, Origin::User, Origin::System]
    );
}

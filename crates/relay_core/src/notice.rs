use std::time::Duration;

pub const SUBMITTING_TEXT: &str = "Submitting…";
pub const SUBMISSION_FAILED_TEXT: &str = "Submission failed ☹︎";
pub const POLL_FAILED_TEXT: &str = "An error occurred while processing your request.";

/// Boundary notices that never reach the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    EmptyInput,
}

impl Notice {
    pub fn text(self) -> &'static str {
        match self {
            Notice::EmptyInput => "Please type an idea first!",
        }
    }
}

pub fn working_status(elapsed: Duration) -> String {
    format!("Working… ( {} s )", format_seconds(elapsed))
}

/// Timeout notice for a polling budget, e.g. "Timed out after 10 min ⏱".
pub fn timeout_notice(budget: Duration) -> String {
    let millis = budget.as_millis();
    if millis >= 60_000 && millis % 60_000 == 0 {
        format!("Timed out after {} min ⏱", millis / 60_000)
    } else {
        format!("Timed out after {} s ⏱", format_seconds(budget))
    }
}

/// Whole seconds print bare; fractions keep up to millisecond precision.
fn format_seconds(duration: Duration) -> String {
    let millis = duration.as_millis();
    let (secs, frac) = (millis / 1000, millis % 1000);
    if frac == 0 {
        return secs.to_string();
    }
    let frac = format!("{frac:03}");
    format!("{secs}.{}", frac.trim_end_matches('0'))
}

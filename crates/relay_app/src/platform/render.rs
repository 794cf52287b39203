use relay_core::{Message, Origin, SessionView};

const USER_PREFIX: &str = "you>   ";
const SYSTEM_PREFIX: &str = "relay> ";
const STATUS_PREFIX: &str = "       · ";
const SESSION_SEPARATOR: &str = "── new session ──";

/// Turns successive transcript views into terminal lines.
///
/// The transcript only grows or rewrites its last entry, so a rewritten
/// placeholder is printed again as a fresh line. Anything else (a cleared
/// session) prints a separator followed by the whole transcript. A
/// non-empty status line is printed beneath whenever it changes.
#[derive(Debug, Default)]
pub(crate) struct TranscriptRenderer {
    shown: Vec<Message>,
    shown_status: String,
}

impl TranscriptRenderer {
    pub(crate) fn render(&mut self, view: &SessionView) -> Vec<String> {
        let next = &view.transcript;
        let common = self
            .shown
            .iter()
            .zip(next.iter())
            .take_while(|(a, b)| a == b)
            .count();
        let is_continuation =
            next.len() >= self.shown.len() && common + 1 >= self.shown.len();

        let mut lines = Vec::new();
        let start = if is_continuation {
            common
        } else {
            lines.push(SESSION_SEPARATOR.to_string());
            0
        };
        for message in &next[start..] {
            lines.extend(format_message(message));
        }
        self.shown = next.clone();

        if view.status_line != self.shown_status {
            if !view.status_line.is_empty() {
                lines.push(format!("{STATUS_PREFIX}{}", view.status_line));
            }
            self.shown_status = view.status_line.clone();
        }
        lines
    }
}

fn format_message(message: &Message) -> Vec<String> {
    let prefix = match message.origin {
        Origin::User => USER_PREFIX,
        Origin::System => SYSTEM_PREFIX,
    };
    let indent = " ".repeat(prefix.chars().count());
    let mut lines: Vec<String> = message
        .text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{prefix}{line}")
            } else {
                format!("{indent}{line}")
            }
        })
        .collect();
    if lines.is_empty() {
        lines.push(prefix.trim_end().to_string());
    }
    lines
}

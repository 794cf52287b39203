use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;

use relay_core::Msg;
use relay_logging::relay_warn;

use super::app::Inbox;

const NEW_SESSION_COMMAND: &str = "/new";
const QUIT_COMMAND: &str = "/quit";

/// Maps one line of terminal input to an inbox item.
pub(crate) fn parse_line(line: &str) -> Inbox {
    match line.trim() {
        NEW_SESSION_COMMAND => Inbox::Msg(Msg::NewSessionRequested),
        QUIT_COMMAND => Inbox::Quit,
        _ => Inbox::Msg(Msg::SubmitRequested(line.to_string())),
    }
}

/// Reads stdin on a background thread until EOF or the inbox closes.
pub(crate) fn spawn_stdin_reader(inbox: mpsc::Sender<Inbox>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let item = match line {
                Ok(line) => parse_line(&line),
                Err(err) => {
                    relay_warn!("Failed to read stdin: {}", err);
                    break;
                }
            };
            if inbox.send(item).is_err() {
                return;
            }
        }
        let _ = inbox.send(Inbox::InputClosed);
    });
}

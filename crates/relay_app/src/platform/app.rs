use std::io::{self, Write};
use std::sync::{mpsc, Arc};

use anyhow::Context;
use log::LevelFilter;
use relay_core::{update, Msg, SessionState};
use relay_engine::ReqwestJobClient;
use relay_logging::relay_info;

use super::config::{config_path, load_config};
use super::effects::EffectRunner;
use super::input::spawn_stdin_reader;
use super::render::TranscriptRenderer;

/// Everything the dispatch loop reacts to.
#[derive(Debug)]
pub(crate) enum Inbox {
    Msg(Msg),
    /// stdin reached EOF; exit once the active job (if any) ends.
    InputClosed,
    Quit,
}

pub fn run_app() -> anyhow::Result<()> {
    let path = config_path();
    let config = load_config(&path)?;
    relay_logging::initialize(config.log_destination, LevelFilter::Info, &config.log_file);
    relay_info!("Loaded config from {:?}", path);

    let policy = config.poll_policy()?;
    let settings = config
        .client_settings()
        .context("invalid endpoint configuration")?;
    let client = Arc::new(ReqwestJobClient::new(settings)?);

    let (inbox_tx, inbox_rx) = mpsc::channel::<Inbox>();
    let runner = EffectRunner::new(client, inbox_tx.clone()).context("failed to start engine")?;
    spawn_stdin_reader(inbox_tx);

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "Describe your startup idea… (/new starts over, /quit exits)"
    )?;
    stdout.flush()?;

    let mut state = SessionState::with_policy(policy);
    let mut renderer = TranscriptRenderer::default();
    let mut input_closed = false;

    while let Ok(item) = inbox_rx.recv() {
        let msg = match item {
            Inbox::Msg(msg) => msg,
            Inbox::InputClosed => {
                input_closed = true;
                Msg::NoOp
            }
            Inbox::Quit => break,
        };

        let (next, effects) = update(state, msg);
        state = next;
        for notice in runner.run(effects) {
            writeln!(stdout, "! {}", notice.text())?;
        }
        if state.consume_dirty() {
            for line in renderer.render(&state.view()) {
                writeln!(stdout, "{line}")?;
            }
        }
        stdout.flush()?;

        if input_closed && !state.is_busy() {
            break;
        }
    }

    runner.shutdown();
    relay_info!("Exiting");
    Ok(())
}

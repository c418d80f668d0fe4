//! Headless mode runner - main event loop without a UI
//!
//! Reads commands from stdin, feeds them to the engine and writes every
//! engine event to stdout.

use std::path::Path;

use tokio::sync::{broadcast, mpsc};

use gridtree_app::config::load_settings;
use gridtree_app::{Engine, EngineEvent, Message};
use gridtree_core::prelude::*;
use gridtree_remote::{HttpTransport, Transport};

use super::{emit_bridge_error, emit_event, HeadlessCommand};

/// Options for a headless run
#[derive(Debug, Clone, Default)]
pub struct HeadlessOptions {
    /// Profile name from `.gridtree/config.toml`
    pub profile: Option<String>,
    /// Root endpoint; the profile's default endpoint when unset
    pub endpoint: Option<String>,
}

/// Run in headless mode - output JSON events instead of a UI
pub async fn run_headless(project_path: &Path, options: HeadlessOptions) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("gridtree starting in HEADLESS mode");
    info!("Project: {}", project_path.display());
    info!("═══════════════════════════════════════════════════════");

    let settings = load_settings(project_path);
    let profile = settings.resolve_profile(options.profile.as_deref());
    profile
        .validate()
        .with_context(|| format!("Invalid API profile {:?}", options.profile))?;
    info!("API base: {}", profile.base_url);

    let transport = HttpTransport::new(&profile).context("Failed to build HTTP client")?;
    let mut engine = Engine::with_settings(project_path.to_path_buf(), settings, profile, transport);
    let mut events = engine.subscribe();

    // Stdin is blocking; read it on its own thread
    let (cmd_tx, cmd_rx) = mpsc::channel::<HeadlessCommand>(64);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(cmd_tx);
    });

    engine.start(options.endpoint);
    flush_events(&mut events);

    let result = headless_event_loop(&mut engine, cmd_rx, &mut events).await;

    engine.shutdown();
    flush_events(&mut events);

    info!("gridtree headless mode exiting");
    result
}

/// Main headless event loop
async fn headless_event_loop<T>(
    engine: &mut Engine<T>,
    mut cmd_rx: mpsc::Receiver<HeadlessCommand>,
    events: &mut broadcast::Receiver<EngineEvent>,
) -> Result<()>
where
    T: Transport + Sync + 'static,
{
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            msg = engine.msg_rx.recv() => match msg {
                Some(msg) => engine.process_message(msg),
                None => return Err(Error::ChannelClosed),
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(cmd) => apply_command(engine, cmd),
                None => {
                    info!("Stdin closed");
                    engine.process_message(Message::Quit);
                }
            },
        }

        flush_events(events);
    }

    Ok(())
}

fn apply_command<T>(engine: &mut Engine<T>, cmd: HeadlessCommand)
where
    T: Transport + Sync + 'static,
{
    match cmd.into_message(&engine.state) {
        Ok(msg) => engine.process_message(msg),
        Err(e) => {
            warn!("Rejected command: {}", e);
            emit_bridge_error(&e.to_string());
        }
    }
}

fn flush_events(events: &mut broadcast::Receiver<EngineEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => emit_event(&event),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("Headless output lagged; {} event(s) dropped", n);
            }
            Err(_) => break,
        }
    }
}

/// Read stdin lines and forward parsed commands (blocking version)
fn spawn_stdin_reader_blocking(cmd_tx: mpsc::Sender<HeadlessCommand>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match HeadlessCommand::parse(trimmed) {
                    Ok(cmd) => {
                        let quit = cmd == HeadlessCommand::Quit;
                        if cmd_tx.blocking_send(cmd).is_err() || quit {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Unknown stdin command: {}", trimmed);
                        emit_bridge_error(&e.to_string());
                    }
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}

//! Engine - shared orchestration state for frontends
//!
//! The Engine owns the application state, the message channel and the table
//! loader. Frontends feed it UI events as [`Message`]s and observe the
//! outcome through [`EngineEvent`]s.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use gridtree_core::prelude::*;
use gridtree_core::{GridKey, SlotId, SlotPath};
use gridtree_remote::{ApiProfile, TableLoader, Transport};

use crate::config::{self, Settings};
use crate::engine_event::EngineEvent;
use crate::message::Message;
use crate::process;
use crate::registry::SlotState;
use crate::state::{AppPhase, AppState};

/// Grid, expansion and slot identities with their generations or states.
///
/// Two snapshots around one message are enough to tell which grids were
/// mounted or dropped and which slots moved.
#[derive(Debug, Clone, Default)]
struct StateSnapshot {
    phase: AppPhase,
    grids: HashMap<GridKey, u64>,
    expansions: BTreeMap<SlotPath, u64>,
    slots: BTreeMap<SlotId, SlotState>,
    error_seq: u64,
}

impl StateSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            phase: state.phase,
            grids: state
                .registry
                .grids()
                .map(|g| (g.key.clone(), g.generation))
                .collect(),
            expansions: state
                .registry
                .expansions()
                .map(|(path, e)| (path.clone(), e.generation))
                .collect(),
            slots: state
                .registry
                .slots()
                .map(|(id, slot)| (id.clone(), slot.state.clone()))
                .collect(),
            error_seq: state.error_seq,
        }
    }
}

/// Drives the grid state machine.
///
/// UI events and fetch results both arrive on `msg_rx`; every mutation goes
/// through `handler::update`, and the resulting changes are broadcast as
/// [`EngineEvent`]s.
pub struct Engine<T> {
    pub state: AppState,

    /// Fetch tasks and input bridges send here
    pub msg_tx: mpsc::Sender<Message>,

    pub msg_rx: mpsc::Receiver<Message>,

    loader: Arc<TableLoader<T>>,

    /// Project directory holding `.gridtree/`
    pub project_path: PathBuf,

    event_tx: broadcast::Sender<EngineEvent>,
}

impl<T> Engine<T>
where
    T: Transport + Sync + 'static,
{
    /// Create an Engine for a project, loading `.gridtree/config.toml`.
    pub fn new(project_path: PathBuf, transport: T) -> Self {
        let settings = config::load_settings(&project_path);
        let profile = settings.active_profile();
        Self::with_settings(project_path, settings, profile, transport)
    }

    /// Create an Engine from already-resolved settings and profile.
    pub fn with_settings(
        project_path: PathBuf,
        settings: Settings,
        profile: ApiProfile,
        transport: T,
    ) -> Self {
        let loader = Arc::new(TableLoader::new(transport, profile.clone()));
        let state = AppState::with_settings(project_path.clone(), settings, profile);
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);
        let (event_tx, _) = broadcast::channel(256);

        Self {
            state,
            msg_tx,
            msg_rx,
            loader,
            project_path,
            event_tx,
        }
    }

    /// Replace the loader, e.g. to install a custom anti-forgery token source.
    pub fn with_loader(mut self, loader: TableLoader<T>) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    pub fn loader(&self) -> &Arc<TableLoader<T>> {
        &self.loader
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Get a sender for the message channel
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Receive grid, slot and error events.
    ///
    /// A receiver more than 256 events behind loses the oldest ones and sees
    /// `Lagged` on its next receive.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Kick off the root load when `behavior.auto_load` is set.
    pub fn start(&mut self, endpoint: Option<String>) {
        if endpoint.is_some() || self.state.settings.behavior.auto_load {
            self.process_message(Message::LoadRoot { endpoint });
        } else {
            info!("auto_load disabled; waiting for a load request");
        }
    }

    /// Apply one message (and any messages it chains) and broadcast what
    /// changed.
    pub fn process_message(&mut self, msg: Message) {
        let pre = StateSnapshot::capture(&self.state);

        process::process_message(&mut self.state, msg, &self.msg_tx, &self.loader);

        let post = StateSnapshot::capture(&self.state);
        self.emit_events(&pre, &post);
    }

    /// Apply every message already queued, without waiting.
    ///
    /// Returns how many were applied.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Wait for the next message and process it.
    ///
    /// Returns `false` when the channel is closed.
    pub async fn process_next(&mut self) -> bool {
        match self.msg_rx.recv().await {
            Some(msg) => {
                self.process_message(msg);
                true
            }
            None => false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Mark the engine as quitting and notify subscribers.
    ///
    /// Fetches still in flight are not cancelled; their results are dropped
    /// once the channel closes.
    pub fn shutdown(&mut self) {
        info!(
            "Shutting down with {} fetch(es) in flight",
            self.state.registry.loading_count()
        );
        self.state.phase = AppPhase::Quitting;
        self.emit(EngineEvent::Shutdown);
    }

    /// Emit EngineEvents for the differences between two snapshots.
    ///
    /// Removals come first so a re-expansion reads as drop-then-build.
    fn emit_events(&self, pre: &StateSnapshot, post: &StateSnapshot) {
        if pre.phase != post.phase {
            self.emit(EngineEvent::PhaseChanged {
                old_phase: pre.phase,
                new_phase: post.phase,
            });
        }

        for key in pre.grids.keys().filter(|k| !post.grids.contains_key(*k)) {
            self.emit(EngineEvent::GridDropped { grid: key.clone() });
        }
        for path in pre.expansions.keys().filter(|p| !post.expansions.contains_key(*p)) {
            self.emit(EngineEvent::RowCollapsed {
                row_path: path.clone(),
            });
        }
        for slot in pre.slots.keys().filter(|s| !post.slots.contains_key(*s)) {
            self.emit(EngineEvent::SlotUnmounted { slot: slot.clone() });
        }

        for (path, generation) in &post.expansions {
            if pre.expansions.get(path) == Some(generation) {
                continue;
            }
            if let Some(expansion) = self.state.registry.expansion(path) {
                self.emit(EngineEvent::RowExpanded {
                    grid: expansion.grid.clone(),
                    template: expansion.template.clone(),
                });
            }
        }

        for (key, generation) in &post.grids {
            if pre.grids.get(key) == Some(generation) {
                continue;
            }
            if let Some(grid) = self.state.registry.grid(key) {
                self.emit(EngineEvent::GridMounted {
                    grid: key.clone(),
                    generation: grid.generation,
                    source: grid.source.clone(),
                    columns: grid.columns.clone(),
                    rows: grid.rows.clone(),
                    shell: grid.shell.clone(),
                });
            }
        }

        for (slot, state) in &post.slots {
            if pre.slots.get(slot) != Some(state) {
                self.emit(EngineEvent::SlotState {
                    slot: slot.clone(),
                    state: state.clone(),
                });
            }
        }

        for error in self.state.errors_since(pre.error_seq) {
            self.emit(EngineEvent::Error {
                error: error.clone(),
            });
        }
    }

    // No subscribers is not an error.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}

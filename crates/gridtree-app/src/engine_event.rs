//! Domain events emitted by the Engine for external consumers
//!
//! Events are broadcast after each message processing cycle via
//! `Engine::subscribe()`, derived by comparing state before and after.

use serde::Serialize;

use gridtree_core::{
    ColumnSpec, GridKey, LevelShell, Record, SlotId, SlotPath, TemplateDescriptor,
};

use crate::registry::SlotState;
use crate::state::{AppPhase, UserError};

/// Domain events emitted by the Engine for external consumers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Grids
    // ─────────────────────────────────────────────────────────
    /// A grid was mounted or remounted
    GridMounted {
        grid: GridKey,
        generation: u64,
        source: String,
        columns: Vec<ColumnSpec>,
        rows: Vec<Record>,
        shell: Option<LevelShell>,
    },

    /// A grid was destroyed along with its ancestor's expansion
    GridDropped { grid: GridKey },

    // ─────────────────────────────────────────────────────────
    // Rows and Slots
    // ─────────────────────────────────────────────────────────
    /// A row's detail area was (re)built
    RowExpanded {
        grid: GridKey,
        template: TemplateDescriptor,
    },

    RowCollapsed { row_path: SlotPath },

    /// A slot changed state
    SlotState { slot: SlotId, state: SlotState },

    /// A slot was destroyed
    SlotUnmounted { slot: SlotId },

    // ─────────────────────────────────────────────────────────
    // Application
    // ─────────────────────────────────────────────────────────
    PhaseChanged { old_phase: AppPhase, new_phase: AppPhase },

    /// An error was pushed onto the user-visible channel
    Error { error: UserError },

    /// The engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Short label for logging and filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::GridMounted { .. } => "grid_mounted",
            EngineEvent::GridDropped { .. } => "grid_dropped",
            EngineEvent::RowExpanded { .. } => "row_expanded",
            EngineEvent::RowCollapsed { .. } => "row_collapsed",
            EngineEvent::SlotState { .. } => "slot_state",
            EngineEvent::SlotUnmounted { .. } => "slot_unmounted",
            EngineEvent::PhaseChanged { .. } => "phase_changed",
            EngineEvent::Error { .. } => "error",
            EngineEvent::Shutdown => "shutdown",
        }
    }
}

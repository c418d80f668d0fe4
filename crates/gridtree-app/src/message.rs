//! Message types for the application (TEA pattern)

use gridtree_core::{GridKey, Record, SlotId};
use gridtree_remote::TableResponse;

use crate::registry::LoadFailure;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // Root Dataset
    // ─────────────────────────────────────────────────────────
    /// Load the root grid; `None` uses the profile's default endpoint
    LoadRoot { endpoint: Option<String> },

    RootLoaded {
        ticket: u64,
        endpoint: String,
        response: Box<TableResponse>,
    },

    RootLoadFailed {
        ticket: u64,
        endpoint: String,
        error: LoadFailure,
    },

    /// Remount the root grid from its current data without refetching
    Refresh,

    // ─────────────────────────────────────────────────────────
    // Rows and Tabs
    // ─────────────────────────────────────────────────────────
    /// A row of `grid` was expanded
    RowExpanded { grid: GridKey, record: Record },

    RowCollapsed { grid: GridKey, record_id: String },

    /// Tab `index` of `record`'s detail area was activated
    TabActivated {
        grid: GridKey,
        record: Record,
        index: usize,
    },

    ChildLoaded {
        slot: SlotId,
        ticket: u64,
        response: Box<TableResponse>,
    },

    ChildLoadFailed {
        slot: SlotId,
        ticket: u64,
        error: LoadFailure,
    },

    // ─────────────────────────────────────────────────────────
    // Row Operations
    // ─────────────────────────────────────────────────────────
    DeleteRow { grid: GridKey, record_id: String },

    RowDeleted { grid: GridKey, record_id: String },

    DeleteFailed {
        grid: GridKey,
        record_id: String,
        error: LoadFailure,
    },

    // ─────────────────────────────────────────────────────────
    // Control
    // ─────────────────────────────────────────────────────────
    /// Drop the oldest entry from the error channel
    DismissError,

    Quit,
}

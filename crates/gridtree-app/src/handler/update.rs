//! Main update function - handles state transitions (TEA pattern)
//!
//! Handler implementations live in:
//! - `root`: root dataset lifecycle, refresh and deletes
//! - `grid`: row expansion, tab activation and child loads

use crate::message::Message;
use crate::state::{AppPhase, AppState};

use super::{grid, root, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.phase = AppPhase::Quitting;
            UpdateResult::none()
        }

        Message::DismissError => {
            state.dismiss_error();
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Root Dataset
        // ─────────────────────────────────────────────────────────
        Message::LoadRoot { endpoint } => root::handle_load_root(state, endpoint),
        Message::RootLoaded {
            ticket,
            endpoint,
            response,
        } => root::handle_root_loaded(state, ticket, endpoint, *response),
        Message::RootLoadFailed {
            ticket,
            endpoint,
            error,
        } => root::handle_root_load_failed(state, ticket, endpoint, error),
        Message::Refresh => root::handle_refresh(state),

        // ─────────────────────────────────────────────────────────
        // Rows and Tabs
        // ─────────────────────────────────────────────────────────
        Message::RowExpanded { grid, record } => grid::handle_row_expanded(state, grid, record),
        Message::RowCollapsed { grid, record_id } => {
            grid::handle_row_collapsed(state, grid, record_id)
        }
        Message::TabActivated {
            grid,
            record,
            index,
        } => grid::handle_tab_activated(state, grid, record, index),
        Message::ChildLoaded {
            slot,
            ticket,
            response,
        } => grid::handle_child_loaded(state, slot, ticket, *response),
        Message::ChildLoadFailed {
            slot,
            ticket,
            error,
        } => grid::handle_child_load_failed(state, slot, ticket, error),

        // ─────────────────────────────────────────────────────────
        // Row Operations
        // ─────────────────────────────────────────────────────────
        Message::DeleteRow { grid, record_id } => root::handle_delete_row(state, grid, record_id),
        Message::RowDeleted { grid, record_id } => {
            root::handle_row_deleted(state, grid, record_id)
        }
        Message::DeleteFailed {
            grid,
            record_id,
            error,
        } => root::handle_delete_failed(state, grid, record_id, error),
    }
}

//! Root dataset handlers: load, refresh and row deletion

use gridtree_core::prelude::*;
use gridtree_core::GridKey;
use gridtree_remote::TableResponse;

use crate::message::Message;
use crate::registry::LoadFailure;
use crate::state::{AppPhase, AppState};

use super::{UpdateAction, UpdateResult};

/// Start a root fetch. Any earlier root fetch still in flight becomes stale.
pub fn handle_load_root(state: &mut AppState, endpoint: Option<String>) -> UpdateResult {
    let endpoint = endpoint
        .filter(|e| !e.trim().is_empty())
        .or_else(|| state.endpoint.clone())
        .unwrap_or_else(|| state.profile.default_endpoint.clone());

    let ticket = state.registry.next_ticket();
    state.root_ticket = Some(ticket);
    state.endpoint = Some(endpoint.clone());
    state.phase = AppPhase::LoadingRoot;

    info!("Loading root dataset from '{}'", endpoint);
    UpdateResult::action(UpdateAction::LoadRoot { endpoint, ticket })
}

pub fn handle_root_loaded(
    state: &mut AppState,
    ticket: u64,
    endpoint: String,
    response: TableResponse,
) -> UpdateResult {
    if state.root_ticket != Some(ticket) {
        warn!("Discarding stale root result for '{}'", endpoint);
        return UpdateResult::none();
    }
    state.root_ticket = None;

    info!(
        "Root dataset loaded: {} rows, {} child table(s)",
        response.rows.len(),
        response.child_tree.len()
    );
    for name in gridtree_core::duplicate_table_names(&response.child_tree) {
        warn!("Table '{}' appears more than once in the child-table tree", name);
    }

    state.registry.mount_root(endpoint, response);
    state.phase = AppPhase::Ready;
    UpdateResult::none()
}

pub fn handle_root_load_failed(
    state: &mut AppState,
    ticket: u64,
    endpoint: String,
    error: LoadFailure,
) -> UpdateResult {
    if state.root_ticket != Some(ticket) {
        warn!("Discarding stale root failure for '{}'", endpoint);
        return UpdateResult::none();
    }
    state.root_ticket = None;

    state.registry.clear();
    state.phase = AppPhase::Failed;
    state.report_error(&error, format!("loading {}", endpoint));
    UpdateResult::none()
}

/// Rebuild the root grid from the data already held.
pub fn handle_refresh(state: &mut AppState) -> UpdateResult {
    if state.registry.remount_root() {
        info!("Refreshed root grid");
        UpdateResult::none()
    } else {
        debug!("Refresh without a mounted root; loading instead");
        UpdateResult::message(Message::LoadRoot { endpoint: None })
    }
}

/// Delete a root row through the root endpoint's base path.
///
/// Child grids are fetched from `route + relation value`, which is not a
/// table base path, so their rows are not deletable.
pub fn handle_delete_row(state: &mut AppState, grid: GridKey, record_id: String) -> UpdateResult {
    if grid != GridKey::Root {
        let error = Error::delete_unsupported(&grid);
        state.report_error(&LoadFailure::from(&error), format!("deleting {}", record_id));
        return UpdateResult::none();
    }
    let Some(handle) = state.registry.grid(&grid) else {
        let error = Error::grid_not_mounted(&grid);
        state.report_error(&LoadFailure::from(&error), format!("deleting {}", record_id));
        return UpdateResult::none();
    };

    if handle.row(&record_id).is_none() {
        warn!("Deleting row {} which is not in grid {}", record_id, grid);
    }
    let base_path = handle.source.clone();

    UpdateResult::action(UpdateAction::DeleteRow {
        grid,
        record_id,
        base_path,
    })
}

/// The server removed the row; reload the root dataset to show it.
pub fn handle_row_deleted(state: &mut AppState, grid: GridKey, record_id: String) -> UpdateResult {
    info!("Deleted row {} from {}", record_id, grid);
    UpdateResult::message(Message::LoadRoot {
        endpoint: state.endpoint.clone(),
    })
}

pub fn handle_delete_failed(
    state: &mut AppState,
    grid: GridKey,
    record_id: String,
    error: LoadFailure,
) -> UpdateResult {
    state.report_error(&error, format!("deleting {} from {}", record_id, grid));
    UpdateResult::none()
}

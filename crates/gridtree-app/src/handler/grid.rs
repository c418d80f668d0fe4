//! Grid handlers: row expansion, tab activation and child-table loads

use gridtree_core::prelude::*;
use gridtree_core::{record_id, GridKey, Record, SlotId};
use gridtree_remote::{child_url, TableResponse};

use crate::registry::{LoadFailure, SlotState};
use crate::state::AppState;

use super::{UpdateAction, UpdateResult};

/// Expand a row: rebuild its detail area and optionally open the first tab.
pub fn handle_row_expanded(state: &mut AppState, grid: GridKey, record: Record) -> UpdateResult {
    let first_tab = match state.registry.expand(&grid, record) {
        Ok(template) => {
            debug!(
                "Expanded {} with {} info field(s) and {} tab(s)",
                template.row_path,
                template.info_items.len(),
                template.tabs.len()
            );
            template.tab(0).map(|tab| tab.slot.clone())
        }
        Err(e) => {
            state.report_error(&LoadFailure::from(&e), format!("expanding a row of {}", grid));
            return UpdateResult::none();
        }
    };

    match first_tab {
        Some(slot) if state.settings.behavior.auto_activate_first_tab => activate_slot(state, slot),
        _ => UpdateResult::none(),
    }
}

pub fn handle_row_collapsed(state: &mut AppState, grid: GridKey, record_id: String) -> UpdateResult {
    let row_path = grid.row_path(record_id);
    if state.registry.collapse(&row_path) {
        debug!("Collapsed {}", row_path);
    }
    UpdateResult::none()
}

/// Activate tab `index` of `record`'s detail area, expanding the row first
/// if it is not expanded yet.
pub fn handle_tab_activated(
    state: &mut AppState,
    grid: GridKey,
    record: Record,
    index: usize,
) -> UpdateResult {
    let Some(id) = record_id(&record) else {
        let error = Error::missing_record_id(grid.table());
        state.report_error(&LoadFailure::from(&error), "activating a tab");
        return UpdateResult::none();
    };

    let row_path = grid.row_path(id);
    if state.registry.expansion(&row_path).is_none() {
        if let Err(e) = state.registry.expand(&grid, record) {
            state.report_error(&LoadFailure::from(&e), format!("expanding {}", row_path));
            return UpdateResult::none();
        }
    }

    let slot = state
        .registry
        .expansion(&row_path)
        .and_then(|expansion| expansion.template.tab(index))
        .map(|tab| tab.slot.clone());

    match slot {
        Some(slot) => activate_slot(state, slot),
        None => {
            warn!("Row {} has no tab {}", row_path, index);
            UpdateResult::none()
        }
    }
}

/// Start loading `slot` unless it is already loading or loaded.
///
/// Configuration problems fail the slot immediately without a request.
fn activate_slot(state: &mut AppState, slot: SlotId) -> UpdateResult {
    let Some(entry) = state.registry.slot(&slot) else {
        warn!("Activation for unmounted slot {}", slot);
        return UpdateResult::none();
    };

    match &entry.state {
        SlotState::Loading { .. } => {
            debug!("Slot {} is already loading", slot);
            return UpdateResult::none();
        }
        SlotState::Loaded => {
            debug!("Slot {} is already loaded", slot);
            return UpdateResult::none();
        }
        SlotState::MountedEmpty | SlotState::LoadError(_) => {}
    }

    let node = entry.node.clone();
    let parent = entry.parent.clone();

    let source = match child_url(&slot.table, &node, &parent) {
        Ok(url) => url,
        Err(e) => {
            let failure = LoadFailure::from(&e);
            state.registry.reject(&slot, failure.clone());
            state.report_error(&failure, format!("loading {}", slot));
            return UpdateResult::none();
        }
    };

    match state.registry.begin_load(&slot, source) {
        Some(ticket) => {
            debug!("Slot {} → loading (ticket {})", slot, ticket);
            UpdateResult::action(UpdateAction::LoadChild {
                slot,
                ticket,
                node,
                parent,
            })
        }
        None => UpdateResult::none(),
    }
}

pub fn handle_child_loaded(
    state: &mut AppState,
    slot: SlotId,
    ticket: u64,
    response: TableResponse,
) -> UpdateResult {
    let rows = response.rows.len();
    if state.registry.finish_load(&slot, ticket, response) {
        info!("Loaded {} row(s) into {}", rows, slot);
    } else {
        warn!("Discarding late result for {} (ticket {})", slot, ticket);
    }
    UpdateResult::none()
}

pub fn handle_child_load_failed(
    state: &mut AppState,
    slot: SlotId,
    ticket: u64,
    error: LoadFailure,
) -> UpdateResult {
    if state.registry.fail_load(&slot, ticket, error.clone()) {
        state.report_error(&error, format!("loading {}", slot));
    } else {
        warn!("Discarding late failure for {} (ticket {})", slot, ticket);
    }
    UpdateResult::none()
}

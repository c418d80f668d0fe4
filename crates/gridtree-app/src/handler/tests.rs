//! Tests for the update function and handlers

use serde_json::{json, Value};

use gridtree_core::{ErrorKind, GridKey, Record, SlotId, SlotPath, ROOT_TABLE};
use gridtree_remote::{decompose, ResponseShape, TableResponse};

use super::*;
use crate::registry::{LoadFailure, SlotState};
use crate::state::{AppPhase, AppState};

// ─────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────

fn record(value: Value) -> Record {
    value.as_object().cloned().unwrap()
}

fn root_body() -> Value {
    json!({
        "data": {"data": [
            {"id": 1, "name": "Ann", "user_id": 5},
            {"id": 2, "name": "Bob"}
        ]},
        "tableConfig": {"columnDefs": [{"field": "name", "headerName": "Name"}]},
        "childTableTree": {
            "orders": {
                "route": "api/orders/by-user/",
                "relationKeyTo": "user_id",
                "pageConfig": {"pluralName": "Orders"},
                "childTables": {
                    "items": {"route": "api/items/by-order/", "relationKeyTo": "id"}
                }
            },
            "invoices": {"route": "api/invoices/by-user/", "relationKeyTo": "user_id"},
            "notes": {"relationKeyTo": "user_id"}
        }
    })
}

fn response(body: Value, shape: ResponseShape) -> TableResponse {
    decompose(body, shape).unwrap()
}

/// State with the root dataset mounted.
fn ready_state() -> AppState {
    let mut state = AppState::new();
    let result = update(&mut state, Message::LoadRoot { endpoint: Some("users".into()) });
    let Some(UpdateAction::LoadRoot { ticket, endpoint }) = result.action else {
        panic!("expected LoadRoot action");
    };
    update(
        &mut state,
        Message::RootLoaded {
            ticket,
            endpoint,
            response: Box::new(response(root_body(), ResponseShape::Root)),
        },
    );
    state
}

fn ann() -> Record {
    record(json!({"id": 1, "name": "Ann", "user_id": 5}))
}

fn slot(table: &str, ancestry: SlotPath) -> SlotId {
    SlotId::new(table, ancestry)
}

fn ann_path() -> SlotPath {
    SlotPath::root().child(ROOT_TABLE, "1")
}

fn expect_load_child(result: UpdateResult) -> (SlotId, u64, Record) {
    match result.action {
        Some(UpdateAction::LoadChild {
            slot,
            ticket,
            parent,
            ..
        }) => (slot, ticket, parent),
        other => panic!("expected LoadChild, got {:?}", other),
    }
}

// ─────────────────────────────────────────────────────────
// Root Dataset
// ─────────────────────────────────────────────────────────

#[test]
fn test_load_root_uses_profile_default_endpoint() {
    let mut state = AppState::new();
    let result = update(&mut state, Message::LoadRoot { endpoint: None });

    assert_eq!(state.phase, AppPhase::LoadingRoot);
    assert!(matches!(
        result.action,
        Some(UpdateAction::LoadRoot { ref endpoint, .. }) if endpoint == "user-management/roles"
    ));
}

#[test]
fn test_root_loaded_mounts_root_grid() {
    let state = ready_state();

    assert_eq!(state.phase, AppPhase::Ready);
    let root = state.registry.root().unwrap();
    assert_eq!(root.rows.len(), 2);
    assert_eq!(root.source, "users");
    assert_eq!(root.child_tree.len(), 3);
}

#[test]
fn test_stale_root_result_is_discarded() {
    let mut state = AppState::new();
    let first = update(&mut state, Message::LoadRoot { endpoint: Some("a".into()) });
    let Some(UpdateAction::LoadRoot { ticket: stale, .. }) = first.action else {
        panic!("expected LoadRoot");
    };
    update(&mut state, Message::LoadRoot { endpoint: Some("b".into()) });

    update(
        &mut state,
        Message::RootLoaded {
            ticket: stale,
            endpoint: "a".into(),
            response: Box::new(response(root_body(), ResponseShape::Root)),
        },
    );
    assert!(state.registry.root().is_none());
    assert_eq!(state.phase, AppPhase::LoadingRoot);
}

#[test]
fn test_root_load_failure_reports_error() {
    let mut state = AppState::new();
    let result = update(&mut state, Message::LoadRoot { endpoint: Some("x".into()) });
    let Some(UpdateAction::LoadRoot { ticket, .. }) = result.action else {
        panic!("expected LoadRoot");
    };

    update(
        &mut state,
        Message::RootLoadFailed {
            ticket,
            endpoint: "x".into(),
            error: LoadFailure::new(ErrorKind::Transport, "API error 500"),
        },
    );
    assert_eq!(state.phase, AppPhase::Failed);
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].kind, ErrorKind::Transport);
}

#[test]
fn test_refresh_remounts_without_fetching() {
    let mut state = ready_state();
    let generation = state.registry.root().unwrap().generation;
    update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });

    let result = update(&mut state, Message::Refresh);
    assert!(result.action.is_none());
    assert!(result.message.is_none());
    assert!(state.registry.root().unwrap().generation > generation);
    assert_eq!(state.registry.slots().count(), 0);
}

#[test]
fn test_refresh_without_root_loads() {
    let mut state = AppState::new();
    let result = update(&mut state, Message::Refresh);
    assert!(matches!(result.message, Some(Message::LoadRoot { endpoint: None })));
}

// ─────────────────────────────────────────────────────────
// Expansion and Activation
// ─────────────────────────────────────────────────────────

#[test]
fn test_row_expansion_auto_activates_first_tab() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });

    let (slot_id, _, parent) = expect_load_child(result);
    assert_eq!(slot_id, slot("orders", ann_path()));
    assert_eq!(parent, ann());

    let expansion = state.registry.expansion(&ann_path()).unwrap();
    let labels: Vec<_> = expansion.template.tabs.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Orders", "Invoices", "Notes"]);
    assert_eq!(
        state.registry.slot_state(&slot("invoices", ann_path())),
        Some(&SlotState::MountedEmpty)
    );
}

#[test]
fn test_row_expansion_without_auto_activation() {
    let mut state = ready_state();
    state.settings.behavior.auto_activate_first_tab = false;

    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    assert!(result.action.is_none());
    assert_eq!(
        state.registry.slot_state(&slot("orders", ann_path())),
        Some(&SlotState::MountedEmpty)
    );
}

#[test]
fn test_row_without_relation_key_has_no_tabs() {
    let mut state = ready_state();
    let bob = record(json!({"id": 2, "name": "Bob"}));

    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: bob });
    assert!(result.action.is_none());
    let path = GridKey::Root.row_path("2");
    assert!(!state.registry.expansion(&path).unwrap().template.has_tabs());
}

#[test]
fn test_repeated_activation_issues_one_fetch() {
    let mut state = ready_state();
    state.settings.behavior.auto_activate_first_tab = false;
    update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });

    let mut fetches = 0;
    for _ in 0..5 {
        let result = update(
            &mut state,
            Message::TabActivated { grid: GridKey::Root, record: ann(), index: 0 },
        );
        if result.action.is_some() {
            fetches += 1;
        }
    }
    assert_eq!(fetches, 1);
}

#[test]
fn test_activation_of_unexpanded_row_expands_first() {
    let mut state = ready_state();
    let result = update(
        &mut state,
        Message::TabActivated { grid: GridKey::Root, record: ann(), index: 1 },
    );

    let (slot_id, _, _) = expect_load_child(result);
    assert_eq!(slot_id, slot("invoices", ann_path()));
    assert!(state.registry.expansion(&ann_path()).is_some());
}

#[test]
fn test_activation_out_of_range_is_ignored() {
    let mut state = ready_state();
    let result = update(
        &mut state,
        Message::TabActivated { grid: GridKey::Root, record: ann(), index: 9 },
    );
    assert!(result.action.is_none());
    assert!(state.errors.is_empty());
}

#[test]
fn test_missing_route_fails_fast_as_config_error() {
    let mut state = ready_state();
    let result = update(
        &mut state,
        Message::TabActivated { grid: GridKey::Root, record: ann(), index: 2 },
    );

    assert!(result.action.is_none());
    let notes = slot("notes", ann_path());
    assert!(matches!(
        state.registry.slot_state(&notes),
        Some(SlotState::LoadError(LoadFailure { kind: ErrorKind::ConfigIntegrity, .. }))
    ));
    assert_eq!(state.errors.last().unwrap().kind, ErrorKind::ConfigIntegrity);
}

// ─────────────────────────────────────────────────────────
// Child Loads
// ─────────────────────────────────────────────────────────

#[test]
fn test_child_loaded_mounts_grid_with_nested_shell() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);

    update(
        &mut state,
        Message::ChildLoaded {
            slot: orders.clone(),
            ticket,
            response: Box::new(response(
                json!({
                    "data": [{"id": 9, "total": 12.5, "paid": true}],
                    "childTableTree": {
                        "items": {"route": "api/items/by-order/", "relationKeyTo": "id"}
                    }
                }),
                ResponseShape::Child,
            )),
        },
    );

    assert_eq!(state.registry.slot_state(&orders), Some(&SlotState::Loaded));
    let grid = state.registry.grid(&GridKey::Slot(orders)).unwrap();
    let fields: Vec<_> = grid.columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["id", "total", "paid"]);
    assert!(grid.shell.is_some());
    assert_eq!(grid.source, "api/orders/by-user/5");
}

#[test]
fn test_nested_expansion_composes_ancestry() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);
    update(
        &mut state,
        Message::ChildLoaded {
            slot: orders.clone(),
            ticket,
            response: Box::new(response(
                json!({
                    "data": [{"id": 9}],
                    "childTableTree": {
                        "items": {"route": "api/items/by-order/", "relationKeyTo": "id"}
                    }
                }),
                ResponseShape::Child,
            )),
        },
    );

    let orders_grid = GridKey::Slot(orders.clone());
    let result = update(
        &mut state,
        Message::RowExpanded { grid: orders_grid, record: record(json!({"id": 9})) },
    );
    let (items, _, parent) = expect_load_child(result);

    assert_eq!(items.ancestry, orders.row_path("9"));
    assert_eq!(items.to_string(), "root:1/orders:9/items");
    assert_eq!(parent, record(json!({"id": 9})));
}

#[test]
fn test_nested_tabs_come_from_configured_child_tables() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);
    update(
        &mut state,
        Message::ChildLoaded {
            slot: orders.clone(),
            ticket,
            response: Box::new(response(json!({"data": [{"id": 9}]}), ResponseShape::Child)),
        },
    );

    let orders_grid = GridKey::Slot(orders.clone());
    assert!(state.registry.grid(&orders_grid).unwrap().is_expandable());

    let result = update(
        &mut state,
        Message::RowExpanded { grid: orders_grid, record: record(json!({"id": 9})) },
    );
    let expansion = state.registry.expansion(&orders.row_path("9")).unwrap();
    assert_eq!(expansion.template.tabs.len(), 1);
    assert_eq!(expansion.template.tabs[0].table_name, "items");

    match result.action {
        Some(UpdateAction::LoadChild { slot, node, .. }) => {
            assert_eq!(slot.to_string(), "root:1/orders:9/items");
            assert_eq!(node.route.as_deref(), Some("api/items/by-order/"));
        }
        other => panic!("expected LoadChild for items, got {:?}", other),
    }
}

#[test]
fn test_failure_in_one_tab_leaves_sibling_loadable() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);

    update(
        &mut state,
        Message::ChildLoadFailed {
            slot: orders.clone(),
            ticket,
            error: LoadFailure::new(ErrorKind::Transport, "API error 500"),
        },
    );

    let result = update(
        &mut state,
        Message::TabActivated { grid: GridKey::Root, record: ann(), index: 1 },
    );
    let (invoices, ticket, _) = expect_load_child(result);
    update(
        &mut state,
        Message::ChildLoaded {
            slot: invoices.clone(),
            ticket,
            response: Box::new(response(json!({"data": [{"id": 3}]}), ResponseShape::Child)),
        },
    );

    assert!(matches!(
        state.registry.slot_state(&orders),
        Some(SlotState::LoadError(_))
    ));
    assert_eq!(state.registry.slot_state(&invoices), Some(&SlotState::Loaded));
    assert_eq!(state.errors.len(), 1);
}

#[test]
fn test_errored_slot_reloads_on_next_activation() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);
    update(
        &mut state,
        Message::ChildLoadFailed {
            slot: orders,
            ticket,
            error: LoadFailure::new(ErrorKind::Transport, "timeout"),
        },
    );

    let retry = update(
        &mut state,
        Message::TabActivated { grid: GridKey::Root, record: ann(), index: 0 },
    );
    let (_, retry_ticket, _) = expect_load_child(retry);
    assert_ne!(retry_ticket, ticket);
}

#[test]
fn test_late_result_after_collapse_is_discarded() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);

    update(
        &mut state,
        Message::RowCollapsed { grid: GridKey::Root, record_id: "1".into() },
    );
    update(
        &mut state,
        Message::ChildLoaded {
            slot: orders.clone(),
            ticket,
            response: Box::new(response(json!({"data": []}), ResponseShape::Child)),
        },
    );

    assert!(state.registry.slot_state(&orders).is_none());
    assert!(state.registry.grid(&GridKey::Slot(orders)).is_none());
}

#[test]
fn test_rows_of_same_table_get_distinct_slots() {
    let mut state = ready_state();
    let other = record(json!({"id": 3, "user_id": 7}));

    let first = expect_load_child(update(
        &mut state,
        Message::RowExpanded { grid: GridKey::Root, record: ann() },
    ));
    let second = expect_load_child(update(
        &mut state,
        Message::RowExpanded { grid: GridKey::Root, record: other },
    ));

    assert_ne!(first.0, second.0);
    assert_eq!(state.registry.loading_count(), 2);
}

// ─────────────────────────────────────────────────────────
// Row Operations
// ─────────────────────────────────────────────────────────

#[test]
fn test_delete_row_uses_grid_source() {
    let mut state = ready_state();
    let result = update(
        &mut state,
        Message::DeleteRow { grid: GridKey::Root, record_id: "1".into() },
    );
    assert_eq!(
        result.action,
        Some(UpdateAction::DeleteRow {
            grid: GridKey::Root,
            record_id: "1".into(),
            base_path: "users".into(),
        })
    );
}

#[test]
fn test_delete_from_child_grid_is_rejected() {
    let mut state = ready_state();
    let result = update(&mut state, Message::RowExpanded { grid: GridKey::Root, record: ann() });
    let (orders, ticket, _) = expect_load_child(result);
    update(
        &mut state,
        Message::ChildLoaded {
            slot: orders.clone(),
            ticket,
            response: Box::new(response(json!({"data": [{"id": 9}]}), ResponseShape::Child)),
        },
    );

    let result = update(
        &mut state,
        Message::DeleteRow { grid: GridKey::Slot(orders.clone()), record_id: "9".into() },
    );

    assert!(result.action.is_none());
    assert_eq!(state.errors.len(), 1);
    assert!(state.errors[0].message.contains("only root rows"));
    assert_eq!(state.registry.grid(&GridKey::Slot(orders)).unwrap().rows.len(), 1);
}

#[test]
fn test_row_deleted_reloads_root() {
    let mut state = ready_state();
    let result = update(
        &mut state,
        Message::RowDeleted { grid: GridKey::Root, record_id: "1".into() },
    );
    assert!(matches!(
        result.message,
        Some(Message::LoadRoot { endpoint: Some(ref e) }) if e == "users"
    ));
}

#[test]
fn test_delete_failed_reports_error_and_keeps_rows() {
    let mut state = ready_state();
    update(
        &mut state,
        Message::DeleteFailed {
            grid: GridKey::Root,
            record_id: "1".into(),
            error: LoadFailure::new(ErrorKind::Transport, "API error 403"),
        },
    );
    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.registry.root().unwrap().rows.len(), 2);
}

#[test]
fn test_dismiss_error_and_quit() {
    let mut state = ready_state();
    update(
        &mut state,
        Message::DeleteRow { grid: GridKey::Slot(slot("nope", SlotPath::root())), record_id: "1".into() },
    );
    assert_eq!(state.errors.len(), 1);

    update(&mut state, Message::DismissError);
    assert!(state.errors.is_empty());

    update(&mut state, Message::Quit);
    assert!(state.should_quit());
}

//! Grid registry - mounted grids, row expansions and per-slot load state
//!
//! The registry is the only owner of slot state. A slot that is not in the
//! registry is unmounted; expanding a row registers its tab slots as
//! `MountedEmpty`, and destroying an ancestor removes every slot, grid and
//! expansion beneath it. Fetch results carry the ticket issued when their
//! slot entered `Loading`, so results for destroyed or re-expanded slots
//! never match and are dropped.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local};
use serde::Serialize;

use gridtree_core::prelude::*;
use gridtree_core::{
    applicable_children, build_level_shell, build_level_template, columns_for, find_config,
    record_id,
    ChildTableNode, ChildTableTree, ColumnSpec, ErrorKind, GridKey, LevelShell, Record, SlotId,
    SlotPath, TableConfig, TemplateDescriptor,
};
use gridtree_remote::TableResponse;

/// Error classification shown in place of a failed grid.
pub type LoadErrorKind = ErrorKind;

/// Displayable copy of a load error, stored in slot state and messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub kind: LoadErrorKind,
    pub message: String,
    /// Re-activating the slot may succeed (false for configuration errors)
    pub retryable: bool,
}

impl LoadFailure {
    pub fn new(kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            retryable: matches!(kind, ErrorKind::Transport | ErrorKind::MalformedResponse),
        }
    }
}

impl From<&Error> for LoadFailure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_recoverable(),
        }
    }
}

/// Load state of a mounted slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SlotState {
    MountedEmpty,
    Loading { ticket: u64 },
    Loaded,
    LoadError(LoadFailure),
}

impl SlotState {
    pub fn label(&self) -> &'static str {
        match self {
            SlotState::MountedEmpty => "mounted_empty",
            SlotState::Loading { .. } => "loading",
            SlotState::Loaded => "loaded",
            SlotState::LoadError(_) => "load_error",
        }
    }

    /// Whether activating the slot should start a fetch.
    pub fn can_load(&self) -> bool {
        matches!(self, SlotState::MountedEmpty | SlotState::LoadError(_))
    }
}

/// A tab slot under an expanded row.
#[derive(Debug, Clone)]
pub struct Slot {
    pub state: SlotState,
    pub node: ChildTableNode,
    /// Record whose relation value parameterizes the fetch
    pub parent: Record,
    /// Route + relation value, set when the first fetch starts
    pub source: Option<String>,
}

/// One rendered table instance.
#[derive(Debug, Clone)]
pub struct GridHandle {
    pub key: GridKey,
    /// Endpoint or route the rows came from; base path for row operations
    pub source: String,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Record>,
    pub table_config: TableConfig,
    /// Children of this grid's table
    pub child_tree: ChildTableTree,
    /// Detail layout, present when the table has children and rows
    pub shell: Option<LevelShell>,
    pub generation: u64,
    pub mounted_at: DateTime<Local>,
}

impl GridHandle {
    pub fn row(&self, id: &str) -> Option<&Record> {
        self.rows
            .iter()
            .find(|row| record_id(row).as_deref() == Some(id))
    }

    pub fn is_expandable(&self) -> bool {
        !self.child_tree.is_empty()
    }
}

/// An expanded row and the template its detail area was built from.
#[derive(Debug, Clone)]
pub struct Expansion {
    pub grid: GridKey,
    pub record: Record,
    pub template: TemplateDescriptor,
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct GridRegistry {
    grids: HashMap<GridKey, GridHandle>,
    slots: BTreeMap<SlotId, Slot>,
    expansions: BTreeMap<SlotPath, Expansion>,
    next_ticket: u64,
    next_generation: u64,
}

impl GridRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────

    pub fn grid(&self, key: &GridKey) -> Option<&GridHandle> {
        self.grids.get(key)
    }

    pub fn root(&self) -> Option<&GridHandle> {
        self.grids.get(&GridKey::Root)
    }

    pub fn grids(&self) -> impl Iterator<Item = &GridHandle> {
        self.grids.values()
    }

    pub fn slot(&self, slot: &SlotId) -> Option<&Slot> {
        self.slots.get(slot)
    }

    /// `None` means unmounted.
    pub fn slot_state(&self, slot: &SlotId) -> Option<&SlotState> {
        self.slots.get(slot).map(|s| &s.state)
    }

    pub fn slots(&self) -> impl Iterator<Item = (&SlotId, &Slot)> {
        self.slots.iter()
    }

    pub fn expansion(&self, row_path: &SlotPath) -> Option<&Expansion> {
        self.expansions.get(row_path)
    }

    pub fn expansions(&self) -> impl Iterator<Item = (&SlotPath, &Expansion)> {
        self.expansions.iter()
    }

    pub fn loading_count(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s.state, SlotState::Loading { .. }))
            .count()
    }

    /// Issue a ticket for a fetch; tickets are never reused.
    pub fn next_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    // ─────────────────────────────────────────────────────────
    // Mounting
    // ─────────────────────────────────────────────────────────

    fn mount(&mut self, key: GridKey, source: String, response: TableResponse) {
        let columns = columns_for(response.column_defs(), &response.rows);
        let shell = if response.child_tree.is_empty() {
            None
        } else {
            build_level_shell(response.sample(), &response.child_tree)
        };
        let generation = self.next_generation();

        debug!(
            "Mounting grid {} ({} rows, {} columns, generation {})",
            key,
            response.rows.len(),
            columns.len(),
            generation
        );

        let handle = GridHandle {
            key: key.clone(),
            source,
            columns,
            rows: response.rows,
            table_config: response.table_config,
            child_tree: response.child_tree,
            shell,
            generation,
            mounted_at: Local::now(),
        };
        self.grids.insert(key, handle);
    }

    /// Replace everything with a freshly loaded root dataset.
    pub fn mount_root(&mut self, source: impl Into<String>, response: TableResponse) {
        self.clear();
        self.mount(GridKey::Root, source.into(), response);
    }

    /// Rebuild the root grid from its current data, dropping every child.
    ///
    /// Returns `false` when no root is mounted.
    pub fn remount_root(&mut self) -> bool {
        let Some(mut root) = self.grids.remove(&GridKey::Root) else {
            return false;
        };
        self.clear();
        root.generation = self.next_generation();
        root.mounted_at = Local::now();
        self.grids.insert(GridKey::Root, root);
        true
    }

    pub fn clear(&mut self) {
        self.grids.clear();
        self.slots.clear();
        self.expansions.clear();
    }

    // ─────────────────────────────────────────────────────────
    // Expansion
    // ─────────────────────────────────────────────────────────

    /// Expand `record` in `grid`, replacing any earlier expansion of it.
    ///
    /// Every tab slot of the new template is registered `MountedEmpty`.
    pub fn expand(&mut self, grid: &GridKey, record: Record) -> Result<&TemplateDescriptor> {
        let handle = self
            .grids
            .get(grid)
            .ok_or_else(|| Error::grid_not_mounted(grid))?;
        let id = record_id(&record).ok_or_else(|| Error::missing_record_id(grid.table()))?;

        let row_path = grid.row_path(id);
        let applicable = applicable_children(&record, Some(&handle.child_tree));
        let template = build_level_template(&record, &applicable, &row_path);

        let removed = self.destroy_under(&row_path);
        if removed > 0 {
            debug!("Re-expanding {}: dropped {} descendant(s)", row_path, removed);
        }

        for tab in &template.tabs {
            if let Some(node) = applicable.get(&tab.table_name) {
                self.slots.insert(
                    tab.slot.clone(),
                    Slot {
                        state: SlotState::MountedEmpty,
                        node: node.clone(),
                        parent: record.clone(),
                        source: None,
                    },
                );
            }
        }

        let generation = self.next_generation();
        let expansion = self.expansions.entry(row_path).or_insert(Expansion {
            grid: grid.clone(),
            record,
            template,
            generation,
        });
        Ok(&expansion.template)
    }

    /// Collapse the row at `row_path`. Returns whether it was expanded.
    pub fn collapse(&mut self, row_path: &SlotPath) -> bool {
        let expanded = self.expansions.contains_key(row_path);
        self.destroy_under(row_path);
        expanded
    }

    /// Remove the expansion at `row_path` and everything mounted beneath it.
    ///
    /// Returns the number of slots, grids and expansions removed.
    pub fn destroy_under(&mut self, row_path: &SlotPath) -> usize {
        let before = self.expansions.len() + self.slots.len() + self.grids.len();
        self.expansions.retain(|path, _| !path.starts_with(row_path));
        self.slots.retain(|slot, _| !slot.is_under(row_path));
        self.grids.retain(|key, _| !key.is_under(row_path));
        before - (self.expansions.len() + self.slots.len() + self.grids.len())
    }

    // ─────────────────────────────────────────────────────────
    // Slot Transitions
    // ─────────────────────────────────────────────────────────

    /// `MountedEmpty | LoadError` → `Loading`. Returns the new ticket, or
    /// `None` when the slot is unmounted, already loading or loaded.
    pub fn begin_load(&mut self, slot: &SlotId, source: String) -> Option<u64> {
        if !self.slots.get(slot)?.state.can_load() {
            return None;
        }
        let ticket = self.next_ticket();
        let entry = self.slots.get_mut(slot)?;
        entry.state = SlotState::Loading { ticket };
        entry.source = Some(source);
        Some(ticket)
    }

    fn is_current(&self, slot: &SlotId, ticket: u64) -> bool {
        matches!(
            self.slots.get(slot),
            Some(Slot { state: SlotState::Loading { ticket: current }, .. }) if *current == ticket
        )
    }

    /// Children of a slot's table as configured upstream: the node's own
    /// `childTables`, else the table's first entry anywhere in the root tree.
    fn configured_children(&self, slot: &SlotId) -> ChildTableTree {
        if let Some(entry) = self.slots.get(slot).filter(|s| s.node.has_children()) {
            return entry.node.child_tables.clone();
        }
        find_config(&slot.table, self.root().map(|root| &root.child_tree))
            .map(|node| node.child_tables.clone())
            .unwrap_or_default()
    }

    /// Apply a fetch result: mount the slot's grid and mark it `Loaded`.
    ///
    /// A response without a child tree inherits the configured one.
    /// Returns `false` (and changes nothing) for stale tickets.
    pub fn finish_load(&mut self, slot: &SlotId, ticket: u64, mut response: TableResponse) -> bool {
        if !self.is_current(slot, ticket) {
            return false;
        }
        if response.child_tree.is_empty() {
            response.child_tree = self.configured_children(slot);
            if !response.child_tree.is_empty() {
                debug!(
                    "{} has no child tree in its response; using {} configured table(s)",
                    slot,
                    response.child_tree.len()
                );
            }
        }
        let source = self
            .slots
            .get(slot)
            .and_then(|s| s.source.clone())
            .unwrap_or_default();
        self.mount(GridKey::Slot(slot.clone()), source, response);
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.state = SlotState::Loaded;
        }
        true
    }

    /// Record a failed fetch. Returns `false` for stale tickets.
    pub fn fail_load(&mut self, slot: &SlotId, ticket: u64, failure: LoadFailure) -> bool {
        if !self.is_current(slot, ticket) {
            return false;
        }
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.state = SlotState::LoadError(failure);
        }
        true
    }

    /// Mark a slot failed without a fetch (the request could not be built).
    pub fn reject(&mut self, slot: &SlotId, failure: LoadFailure) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.state.can_load() => {
                entry.state = SlotState::LoadError(failure);
                true
            }
            _ => false,
        }
    }
}

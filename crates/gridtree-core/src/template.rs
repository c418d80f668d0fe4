//! Detail Template Synthesizer
//!
//! Builds the data-only description of a row's expansion: its info fields
//! and one tab per applicable child table. Tabs carry the [`SlotId`] the
//! child grid will be mounted at; mounting itself is up to the caller.

use serde::Serialize;

use crate::label::{format_field_label, format_tab_name};
use crate::record::{info_fields, is_action_field, Record};
use crate::slot::{SlotId, SlotPath};
use crate::tree::ChildTableTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoRender {
    Plain,
    Boolean,
}

/// One labeled scalar field in the info section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InfoItem {
    pub field: String,
    pub label: String,
    pub render: InfoRender,
}

/// One child-table tab and the slot its grid mounts into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChildTab {
    pub table_name: String,
    pub label: String,
    pub slot: SlotId,
}

/// Expansion layout for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    /// Ancestry path ending in the expanded record.
    pub row_path: SlotPath,
    pub info_items: Vec<InfoItem>,
    pub tabs: Vec<ChildTab>,
}

impl TemplateDescriptor {
    pub fn has_tabs(&self) -> bool {
        !self.tabs.is_empty()
    }

    pub fn tab(&self, index: usize) -> Option<&ChildTab> {
        self.tabs.get(index)
    }

    pub fn tab_for_table(&self, table_name: &str) -> Option<&ChildTab> {
        self.tabs.iter().find(|tab| tab.table_name == table_name)
    }
}

/// Per-grid layout derived once from a sample row when the grid is mounted.
///
/// Renderers use it to lay out the detail area before any row is expanded
/// and to decide whether rows are expandable at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelShell {
    pub info_items: Vec<InfoItem>,
    /// `(table name, tab label)` for every child table this level declares.
    pub tab_labels: Vec<(String, String)>,
}

fn info_items(record: &Record) -> Vec<InfoItem> {
    info_fields(record)
        .filter(|(field, _)| !is_action_field(field))
        .map(|(field, value)| InfoItem {
            field: field.clone(),
            label: format_field_label(field),
            render: if value.is_boolean() {
                InfoRender::Boolean
            } else {
                InfoRender::Plain
            },
        })
        .collect()
}

/// Build the expansion template for `record`.
///
/// `applicable` is the record's applicable child tables (see
/// [`applicable_children`](crate::resolver::applicable_children)) and
/// `row_path` the ancestry ending in `record`; each tab's slot is
/// `row_path` + table name, so slots stay unique at any depth.
pub fn build_level_template(
    record: &Record,
    applicable: &ChildTableTree,
    row_path: &SlotPath,
) -> TemplateDescriptor {
    let tabs = applicable
        .iter()
        .map(|(table_name, node)| ChildTab {
            table_name: table_name.clone(),
            label: format_tab_name(table_name, Some(node)),
            slot: SlotId::new(table_name.clone(), row_path.clone()),
        })
        .collect();

    TemplateDescriptor {
        row_path: row_path.clone(),
        info_items: info_items(record),
        tabs,
    }
}

/// Build the shell for a grid from its first row and its child tree.
///
/// Returns `None` when there is no sample row to derive a layout from.
pub fn build_level_shell(sample: Option<&Record>, tree: &ChildTableTree) -> Option<LevelShell> {
    let Some(sample) = sample else {
        tracing::warn!("No sample record available to generate detail template");
        return None;
    };

    Some(LevelShell {
        info_items: info_items(sample),
        tab_labels: tree
            .iter()
            .map(|(name, node)| (name.clone(), format_tab_name(name, Some(node))))
            .collect(),
    })
}

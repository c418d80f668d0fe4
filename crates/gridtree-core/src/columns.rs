//! Column Projector
//!
//! Turns the server's declarative column list, or when there is none the
//! shape of a sample row, into renderer-neutral [`ColumnSpec`]s.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::label::format_field_label;
use crate::record::{is_action_field, is_info_value, Record, ACTION_COLUMN_FIELD};
use crate::tree::ColumnDef;

/// Width used when a column definition carries none.
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

/// Width of the inferred trailing action column.
pub const ACTION_COLUMN_WIDTH: u32 = 140;

const BOOLEAN_RENDERER: &str = "booleanRenderer";
const ICON_RENDERER: &str = "iconRenderer";
const ACTIONS_RENDERER: &str = "actionsRenderer";

/// `data.role ? data.role.name : data.role_id`
static CONDITIONAL_GETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\w+\.(\w+)\s*\?\s*\w+\.\w+\.(\w+)").expect("Invalid CONDITIONAL_GETTER")
});

/// `data.role.name`
static PATH_GETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\w+\.(\w+)\.(\w+)[\w.]*\s*$").expect("Invalid PATH_GETTER")
});

/// How a cell's value is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Raw value as text
    Plain,
    /// Check / cross glyph
    Boolean,
    /// The value names an icon
    Icon,
    /// `record[relation][field]`, or the column's own field when the
    /// relation is missing or null on a record
    RelatedLookup { relation: String, field: String },
    /// Server-rendered action markup read from `source`
    ActionMarkup { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pin {
    Left,
}

/// Renderer-neutral column description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    pub width: u32,
    pub visible: bool,
    pub sortable: bool,
    pub filterable: bool,
    pub pinned: Option<Pin>,
    pub render: RenderStrategy,
}

/// A cell evaluated against one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Bool(bool),
    Icon(String),
    Markup(String),
}

impl ColumnSpec {
    fn plain(field: &str, label: String, width: u32) -> Self {
        Self {
            field: field.to_string(),
            label,
            width,
            visible: true,
            sortable: false,
            filterable: false,
            pinned: None,
            render: RenderStrategy::Plain,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self.render, RenderStrategy::ActionMarkup { .. })
    }

    /// Evaluate this column for `record`.
    pub fn cell(&self, record: &Record) -> CellValue {
        match &self.render {
            RenderStrategy::Plain => text_cell(record.get(&self.field)),
            RenderStrategy::Boolean => match record.get(&self.field) {
                None | Some(Value::Null) => CellValue::Empty,
                Some(Value::Bool(b)) => CellValue::Bool(*b),
                Some(Value::Number(n)) => CellValue::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
                Some(Value::String(s)) => CellValue::Bool(!s.is_empty()),
                Some(_) => CellValue::Bool(true),
            },
            RenderStrategy::Icon => match text_cell(record.get(&self.field)) {
                CellValue::Text(name) => CellValue::Icon(name),
                other => other,
            },
            RenderStrategy::RelatedLookup { relation, field } => {
                match record.get(relation) {
                    Some(Value::Object(related)) => text_cell(related.get(field)),
                    _ => text_cell(record.get(&self.field)),
                }
            }
            RenderStrategy::ActionMarkup { source } => match record.get(source) {
                Some(Value::String(markup)) if !markup.is_empty() => {
                    CellValue::Markup(markup.clone())
                }
                _ => CellValue::Empty,
            },
        }
    }
}

fn text_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Empty,
        Some(Value::String(s)) => CellValue::Text(s.clone()),
        Some(other) => CellValue::Text(other.to_string()),
    }
}

/// Split a relational value-getter expression into `(relation, field)`.
///
/// Understands `data.rel ? data.rel.field : data.fk` and `data.rel.field`.
pub fn parse_value_getter(expr: &str) -> Option<(String, String)> {
    let captures = if expr.contains('?') {
        CONDITIONAL_GETTER.captures(expr)?
    } else {
        PATH_GETTER.captures(expr)?
    };
    Some((captures[1].to_string(), captures[2].to_string()))
}

/// Project declarative column definitions.
///
/// Action columns are moved to the front, pinned left and made
/// non-sortable and non-filterable wherever they appear in `defs`.
pub fn project(defs: &[ColumnDef]) -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = Vec::with_capacity(defs.len());

    for def in defs {
        let field = def.field.clone().unwrap_or_default();
        let label = def
            .header_name
            .clone()
            .or_else(|| def.header_text.clone())
            .unwrap_or_default();

        let mut column = ColumnSpec {
            field,
            label,
            width: def.width.unwrap_or(DEFAULT_COLUMN_WIDTH),
            visible: !def.hide,
            sortable: def.is_sortable(),
            filterable: def.is_filterable(),
            pinned: None,
            render: RenderStrategy::Plain,
        };

        match def.cell_renderer.as_deref() {
            Some(ACTIONS_RENDERER) => {
                if column.label.is_empty() {
                    column.label = "Actions".to_string();
                }
                column.sortable = false;
                column.filterable = false;
                column.pinned = Some(Pin::Left);
                column.render = RenderStrategy::ActionMarkup {
                    source: ACTION_COLUMN_FIELD.to_string(),
                };
                columns.insert(0, column);
                continue;
            }
            Some(BOOLEAN_RENDERER) => column.render = RenderStrategy::Boolean,
            Some(ICON_RENDERER) => column.render = RenderStrategy::Icon,
            _ => {}
        }

        if let Some(expr) = def.value_getter.as_deref() {
            column.render = match parse_value_getter(expr) {
                Some((relation, field)) => RenderStrategy::RelatedLookup { relation, field },
                None => {
                    tracing::debug!(
                        "Unparseable valueGetter for '{}', showing raw field: {}",
                        column.field,
                        expr
                    );
                    RenderStrategy::Plain
                }
            };
        }

        columns.push(column);
    }

    columns
}

/// Infer columns from the shape of a sample row.
pub fn infer(sample: &Record) -> Vec<ColumnSpec> {
    let mut columns: Vec<ColumnSpec> = sample
        .iter()
        .filter(|(field, value)| is_info_value(value) && !is_action_field(field))
        .map(|(field, value)| {
            let mut column =
                ColumnSpec::plain(field, format_field_label(field), DEFAULT_COLUMN_WIDTH);
            if value.is_boolean() {
                column.render = RenderStrategy::Boolean;
            }
            column
        })
        .collect();

    let has_actions = match sample.get(ACTION_COLUMN_FIELD) {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    };
    if has_actions {
        let mut actions = ColumnSpec::plain("", "Actions".to_string(), ACTION_COLUMN_WIDTH);
        actions.render = RenderStrategy::ActionMarkup {
            source: ACTION_COLUMN_FIELD.to_string(),
        };
        columns.push(actions);
    }

    columns
}

/// Declared columns when the server sent any, otherwise inferred from the
/// first row. No declaration and no rows yields no columns.
pub fn columns_for(declared: Option<&[ColumnDef]>, rows: &[Record]) -> Vec<ColumnSpec> {
    match (declared, rows.first()) {
        (Some(defs), _) => project(defs),
        (None, Some(sample)) => infer(sample),
        (None, None) => Vec::new(),
    }
}

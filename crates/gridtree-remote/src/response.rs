//! Decomposition of API responses into rows, table config and child tree
//!
//! Endpoints disagree on where they put things:
//!
//! ```json
//! { "data": { "data": [ ... ] } | [ ... ],
//!   "tableConfig": { "columnDefs": [...], "childTableTree": {...}? },
//!   "childTableTree": {...}?,
//!   "allChildTables": {...}? }
//! ```
//!
//! The child tree is taken from the first of `tableConfig.childTableTree`,
//! `childTableTree` and `allChildTables` that is present.

use serde_json::{Map, Value};

use gridtree_core::prelude::*;
use gridtree_core::{ChildTableTree, ColumnDef, Record, TableConfig};

/// Which kind of request produced a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Root dataset: `tableConfig` is required.
    Root,
    /// One child table's rows: `tableConfig` may be omitted.
    Child,
}

/// Where a response's child tree was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSource {
    TableConfig,
    TopLevel,
    AllChildTables,
    Absent,
}

/// The three logical parts of every table response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableResponse {
    pub rows: Vec<Record>,
    /// Table config with its `child_table_tree` moved into `child_tree`
    pub table_config: TableConfig,
    /// Children of *this* table; empty when it has none
    pub child_tree: ChildTableTree,
}

impl TableResponse {
    pub fn column_defs(&self) -> Option<&[ColumnDef]> {
        self.table_config.column_defs.as_deref()
    }

    pub fn sample(&self) -> Option<&Record> {
        self.rows.first()
    }
}

/// Split a response body into rows, table config and child tree.
pub fn decompose(body: Value, shape: ResponseShape) -> Result<TableResponse> {
    let Value::Object(mut body) = body else {
        return Err(Error::malformed("response body is not a JSON object"));
    };

    let rows = take_rows(&mut body)?;

    let mut table_config = match body.remove("tableConfig") {
        Some(Value::Object(config)) => serde_json::from_value::<TableConfig>(Value::Object(config))
            .map_err(|e| Error::malformed(format!("invalid tableConfig: {e}")))?,
        Some(Value::Null) | None if shape == ResponseShape::Child => TableConfig::default(),
        Some(Value::Null) | None => return Err(Error::malformed("response has no tableConfig")),
        Some(_) => return Err(Error::malformed("tableConfig is not an object")),
    };

    let (child_tree, source) = if let Some(tree) = table_config.child_table_tree.take() {
        (tree, TreeSource::TableConfig)
    } else if let Some(tree) = take_tree(&mut body, "childTableTree")? {
        (tree, TreeSource::TopLevel)
    } else if let Some(tree) = take_tree(&mut body, "allChildTables")? {
        (tree, TreeSource::AllChildTables)
    } else {
        (ChildTableTree::new(), TreeSource::Absent)
    };

    trace!(
        "Decomposed {:?} response: {} rows, {} child tables from {:?}",
        shape,
        rows.len(),
        child_tree.len(),
        source
    );

    Ok(TableResponse {
        rows,
        table_config,
        child_tree,
    })
}

/// `data` as either `{ "data": [...] }` or `[...]`.
fn take_rows(body: &mut Map<String, Value>) -> Result<Vec<Record>> {
    let rows = match body.remove("data") {
        Some(Value::Array(rows)) => rows,
        Some(Value::Object(mut wrapper)) => match wrapper.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(Error::malformed("data.data is missing or not an array")),
        },
        Some(_) => return Err(Error::malformed("data is neither an array nor an object")),
        None => return Err(Error::malformed("response has no data")),
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Value::Object(record) => Ok(record),
            _ => Err(Error::malformed(format!("row {index} is not an object"))),
        })
        .collect()
}

fn take_tree(body: &mut Map<String, Value>, key: &str) -> Result<Option<ChildTableTree>> {
    match body.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| Error::malformed(format!("invalid {key}: {e}"))),
    }
}

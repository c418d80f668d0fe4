//! Slot identities for mounted grids.
//!
//! A slot is the position a child grid is mounted at: a table name plus the
//! full ancestry of parent records that lead to it. Composing the whole
//! ancestry keeps grids at different tree positions apart at any depth, e.g.
//! `items` under order 9 of user 5 and `items` under order 9 of user 7.

use serde::{Deserialize, Serialize};

/// Table name used for the root grid's own rows in ancestry paths.
pub const ROOT_TABLE: &str = "root";

/// One step in an ancestry path: the table a record lives in and its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathSegment {
    pub table: String,
    pub record_id: String,
}

/// Ancestry of parent records, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotPath(Vec<PathSegment>);

impl SlotPath {
    /// The empty path (above the root grid).
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend this path with one more parent record.
    pub fn child(&self, table: impl Into<String>, record_id: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment {
            table: table.into(),
            record_id: record_id.into(),
        });
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Whether `self` lies at or below `ancestor`.
    pub fn starts_with(&self, ancestor: &SlotPath) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

impl std::fmt::Display for SlotPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}:{}", seg.table, seg.record_id)?;
        }
        Ok(())
    }
}

/// Identity of a child-grid slot: table name + ancestry of parent records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId {
    pub table: String,
    pub ancestry: SlotPath,
}

impl SlotId {
    pub fn new(table: impl Into<String>, ancestry: SlotPath) -> Self {
        Self {
            table: table.into(),
            ancestry,
        }
    }

    /// Ancestry path of a row displayed in this slot's grid.
    pub fn row_path(&self, record_id: impl Into<String>) -> SlotPath {
        self.ancestry.child(self.table.clone(), record_id)
    }

    /// Whether this slot sits under the expansion of the row at `row_path`.
    pub fn is_under(&self, row_path: &SlotPath) -> bool {
        self.ancestry.starts_with(row_path)
    }

    /// Stable string key, e.g. `root:5/orders:9/items`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ancestry.depth() == 0 {
            write!(f, "{}", self.table)
        } else {
            write!(f, "{}/{}", self.ancestry, self.table)
        }
    }
}

/// Identity of a mounted grid: the root grid or a child slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKey {
    Root,
    Slot(SlotId),
}

impl GridKey {
    /// Table name the grid's rows belong to.
    pub fn table(&self) -> &str {
        match self {
            GridKey::Root => ROOT_TABLE,
            GridKey::Slot(slot) => &slot.table,
        }
    }

    /// Ancestry path of one of this grid's rows.
    pub fn row_path(&self, record_id: impl Into<String>) -> SlotPath {
        match self {
            GridKey::Root => SlotPath::root().child(ROOT_TABLE, record_id),
            GridKey::Slot(slot) => slot.row_path(record_id),
        }
    }

    /// Whether this grid sits under the expansion of the row at `row_path`.
    pub fn is_under(&self, row_path: &SlotPath) -> bool {
        match self {
            GridKey::Root => false,
            GridKey::Slot(slot) => slot.is_under(row_path),
        }
    }
}

impl std::fmt::Display for GridKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridKey::Root => write!(f, "{ROOT_TABLE}"),
            GridKey::Slot(slot) => write!(f, "{slot}"),
        }
    }
}

/// A grid key string that is not `root` or `table:id/.../table`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid grid key '{0}'")]
pub struct ParseGridKeyError(pub String);

impl std::str::FromStr for GridKey {
    type Err = ParseGridKeyError;

    /// Parse the [`Display`](std::fmt::Display) form back into a key.
    ///
    /// Record ids containing `/` or `:` do not survive the round trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseGridKeyError(s.to_string());
        let s_trimmed = s.trim();
        if s_trimmed == ROOT_TABLE {
            return Ok(GridKey::Root);
        }

        let mut parts: Vec<&str> = s_trimmed.split('/').collect();
        let table = parts.pop().filter(|t| !t.is_empty()).ok_or_else(invalid)?;
        if table.contains(':') {
            return Err(invalid());
        }

        let mut ancestry = SlotPath::root();
        for part in parts {
            let (parent, id) = part.split_once(':').ok_or_else(invalid)?;
            if parent.is_empty() || id.is_empty() {
                return Err(invalid());
            }
            ancestry = ancestry.child(parent, id);
        }
        Ok(GridKey::Slot(SlotId::new(table, ancestry)))
    }
}

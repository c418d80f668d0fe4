//! # gridtree-core - Core Domain Types
//!
//! Foundation crate for gridtree. Provides the record and configuration
//! model, error handling, and the pure parts of the grid engine: the config
//! tree resolver, the column projector and the detail template synthesizer.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, indexmap, thiserror, regex, tracing).
//!
//! ## Public API
//!
//! ### Configuration Model (`tree`)
//! - [`ChildTableTree`] - Ordered table-name → [`ChildTableNode`] mapping
//! - [`ColumnDef`], [`TableConfig`], [`PageConfig`] - Server column / table config
//!
//! ### Records (`record`)
//! - [`Record`] - Ordered JSON object for one row
//!
//! ### Slots (`slot`)
//! - [`SlotId`], [`SlotPath`], [`GridKey`] - Ancestry-composed grid identities
//!
//! ### Engine (`resolver`, `columns`, `template`)
//! - [`find_config()`], [`applicable_children()`] - Tree lookups
//! - [`project()`], [`infer()`] - Column projection
//! - [`build_level_template()`] - Row expansion layout
//!
//! ### Logging (`logging`)
//! - [`logging::init()`] - Daily rolling file log, filtered by `GRIDTREE_LOG`
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum distinguishing transport, configuration
//!   and response-shape failures
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`

pub mod columns;
pub mod error;
pub mod label;
pub mod logging;
pub mod record;
pub mod resolver;
pub mod slot;
pub mod template;
pub mod tree;

/// Prelude for common imports used throughout all gridtree crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use columns::{
    columns_for, infer, parse_value_getter, project, CellValue, ColumnSpec, Pin, RenderStrategy,
    ACTION_COLUMN_WIDTH, DEFAULT_COLUMN_WIDTH,
};
pub use error::{Error, ErrorKind, Result, ResultExt};
pub use label::{format_field_label, format_tab_name};
pub use record::{
    info_fields, is_action_field, is_info_value, record_id, scalar_to_string, Record,
    ACTION_COLUMN_FIELD, ACTION_FIELDS,
};
pub use resolver::{
    applicable_children, duplicate_table_names, find_config, resolve_config, ConfigMatch,
    MatchKind, Resolution,
};
pub use slot::{GridKey, ParseGridKeyError, PathSegment, SlotId, SlotPath, ROOT_TABLE};
pub use template::{
    build_level_shell, build_level_template, ChildTab, InfoItem, InfoRender, LevelShell,
    TemplateDescriptor,
};
pub use tree::{ChildTableNode, ChildTableTree, ColumnDef, PageConfig, TableConfig};

//! State transitions for every [`Message`]
//!
//! - `update`: dispatch
//! - `root`: root dataset lifecycle, refresh and row deletion
//! - `grid`: row expansion, tab activation and child load results

pub(crate) mod grid;
pub(crate) mod root;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use gridtree_core::{ChildTableNode, GridKey, Record, SlotId};

use crate::message::Message;

pub use update::update;

/// Side effects requested by `update`, run by `actions::handle_action`
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateAction {
    /// Fetch the root dataset
    LoadRoot { endpoint: String, ticket: u64 },

    /// Fetch one child table for one parent record
    LoadChild {
        slot: SlotId,
        ticket: u64,
        node: ChildTableNode,
        parent: Record,
    },

    /// Delete a row through its grid's base path
    DeleteRow {
        grid: GridKey,
        record_id: String,
        base_path: String,
    },
}

/// What `update` wants to happen next
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Chained message, applied before returning to the loop
    pub message: Option<Message>,
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }
}

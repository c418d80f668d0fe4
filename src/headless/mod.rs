//! Headless mode - JSON-lines bridge between a UI layer and the engine
//!
//! The UI layer writes one JSON command per line on stdin and reads one JSON
//! event per line from stdout.
//!
//! # Commands
//!
//! ```json
//! {"event":"load","endpoint":"user-management/users"}
//! {"event":"expand","grid":"root","id":5}
//! {"event":"activate","grid":"root","id":5,"index":1}
//! {"event":"collapse","grid":"root","id":5}
//! {"event":"delete","grid":"root","id":5}
//! {"event":"refresh"}
//! {"event":"quit"}
//! ```
//!
//! `grid` is the grid key as printed in events (`root`, `root:5/orders`).
//! Rows are named by `id`; a full `record` may be sent instead.
//!
//! # Events
//!
//! Every [`EngineEvent`] is written with a `timestamp` (ms since epoch), e.g.
//! `{"event":"slot_state","slot":{..},"state":{"state":"loading","ticket":3},"timestamp":..}`.

pub mod runner;

use std::io::{self, Write};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gridtree_app::{AppState, EngineEvent, Message};
use gridtree_core::prelude::*;
use gridtree_core::{scalar_to_string, GridKey, Record};

/// Commands accepted on stdin
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessCommand {
    Load {
        #[serde(default)]
        endpoint: Option<String>,
    },
    Expand {
        grid: String,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        record: Option<Record>,
    },
    Activate {
        grid: String,
        #[serde(default)]
        id: Option<Value>,
        #[serde(default)]
        record: Option<Record>,
        #[serde(default)]
        index: usize,
    },
    Collapse {
        grid: String,
        id: Value,
    },
    Delete {
        grid: String,
        id: Value,
    },
    Refresh,
    Dismiss,
    Quit,
}

impl HeadlessCommand {
    /// Parse one stdin line.
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Translate into an engine message, resolving rows by id.
    pub fn into_message(self, state: &AppState) -> Result<Message> {
        Ok(match self {
            HeadlessCommand::Load { endpoint } => Message::LoadRoot { endpoint },
            HeadlessCommand::Expand { grid, id, record } => {
                let grid = parse_grid(&grid)?;
                let record = resolve_record(state, &grid, id.as_ref(), record)?;
                Message::RowExpanded { grid, record }
            }
            HeadlessCommand::Activate {
                grid,
                id,
                record,
                index,
            } => {
                let grid = parse_grid(&grid)?;
                let record = resolve_record(state, &grid, id.as_ref(), record)?;
                Message::TabActivated {
                    grid,
                    record,
                    index,
                }
            }
            HeadlessCommand::Collapse { grid, id } => Message::RowCollapsed {
                grid: parse_grid(&grid)?,
                record_id: scalar_to_string(&id),
            },
            HeadlessCommand::Delete { grid, id } => Message::DeleteRow {
                grid: parse_grid(&grid)?,
                record_id: scalar_to_string(&id),
            },
            HeadlessCommand::Refresh => Message::Refresh,
            HeadlessCommand::Dismiss => Message::DismissError,
            HeadlessCommand::Quit => Message::Quit,
        })
    }
}

fn parse_grid(grid: &str) -> Result<GridKey> {
    grid.parse::<GridKey>()
        .map_err(|e| Error::config(e.to_string()))
}

fn resolve_record(
    state: &AppState,
    grid: &GridKey,
    id: Option<&Value>,
    record: Option<Record>,
) -> Result<Record> {
    if let Some(record) = record {
        return Ok(record);
    }
    let id = id
        .map(scalar_to_string)
        .ok_or_else(|| Error::config("command needs an 'id' or a 'record'"))?;
    let handle = state
        .registry
        .grid(grid)
        .ok_or_else(|| Error::grid_not_mounted(grid))?;
    handle
        .row(&id)
        .cloned()
        .ok_or_else(|| Error::config(format!("no row with id {} in {}", id, grid)))
}

/// One stdout line: an engine event plus a timestamp
#[derive(Serialize)]
struct EventLine<'a> {
    #[serde(flatten)]
    event: &'a EngineEvent,
    timestamp: i64,
}

/// A command that could not be parsed or applied
#[derive(Serialize)]
struct BridgeErrorLine<'a> {
    event: &'static str,
    message: &'a str,
    timestamp: i64,
}

/// Emit an engine event to stdout as JSON
pub fn emit_event(event: &EngineEvent) {
    write_line(&EventLine {
        event,
        timestamp: Utc::now().timestamp_millis(),
    });
}

/// Emit a `bridge_error` line for a rejected command
pub fn emit_bridge_error(message: &str) {
    write_line(&BridgeErrorLine {
        event: "bridge_error",
        message,
        timestamp: Utc::now().timestamp_millis(),
    });
}

fn write_line<T: Serialize>(value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize headless event: {}", e);
            return;
        }
    };

    // NDJSON: one event per line, flushed immediately
    let mut stdout = io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", json) {
        error!("Failed to write headless event to stdout: {}", e);
        return;
    }
    if let Err(e) = stdout.flush() {
        error!("Failed to flush headless stdout: {}", e);
    }
}

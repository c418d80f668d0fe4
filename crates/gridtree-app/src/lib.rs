//! gridtree-app - Lazy grid orchestration for gridtree
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the grid
//! state machine: UI events arrive as [`Message`]s, `handler::update` applies
//! them to [`AppState`], and fetches run as spawned tasks that report back
//! through the same channel. The [`Engine`] ties this together and also
//! loads `.gridtree/config.toml`.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod process;
pub mod registry;
pub mod state;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use registry::{
    Expansion, GridHandle, GridRegistry, LoadErrorKind, LoadFailure, Slot, SlotState,
};
pub use state::{AppPhase, AppState, UserError};

//! Configuration file parsing for gridtree
//!
//! Supports:
//! - `.gridtree/config.toml` - API profiles and behavior settings

pub mod settings;
pub mod types;

pub use settings::{init_config_dir, load_settings, CONFIG_FILENAME, GRIDTREE_DIR, TOKEN_ENV};
pub use types::*;

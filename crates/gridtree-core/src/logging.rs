//! File logging through `tracing`
//!
//! Stdout belongs to the headless event stream, so logs only go to a daily
//! rolling file. `GRIDTREE_LOG` sets the filter (`EnvFilter` syntax) and
//! `GRIDTREE_LOG_DIR` moves the log directory.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

pub const LOG_FILTER_ENV: &str = "GRIDTREE_LOG";
pub const LOG_DIR_ENV: &str = "GRIDTREE_LOG_DIR";

const LOG_FILE_PREFIX: &str = "gridtree.log";
const DEFAULT_FILTER: &str = "gridtree=info,warn";

/// Where logs go and what gets through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub directory: PathBuf,
    pub filter: String,
}

impl LogConfig {
    /// Resolve from the environment.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var_os(LOG_DIR_ENV).map(PathBuf::from),
        )
    }

    /// Resolve from explicit overrides; empty values fall back to defaults.
    pub fn resolve(filter: Option<String>, directory: Option<PathBuf>) -> Self {
        Self {
            directory: directory
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(default_log_directory),
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        }
    }

    /// Path of the file the appender writes to (without the date suffix).
    pub fn log_file(&self) -> PathBuf {
        self.directory.join(LOG_FILE_PREFIX)
    }
}

/// Initialize file logging from the environment.
///
/// # Examples
/// ```bash
/// GRIDTREE_LOG=debug gridtree --endpoint user-management/roles
/// GRIDTREE_LOG=gridtree_app=trace gridtree
/// ```
pub fn init() -> Result<()> {
    init_with(&LogConfig::from_env())
}

/// Initialize file logging with an explicit configuration.
pub fn init_with(config: &LogConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.directory, LOG_FILE_PREFIX);
    let env_filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|e| {
        eprintln!("Ignoring invalid {}='{}': {}", LOG_FILTER_ENV, config.filter, e);
        EnvFilter::new(DEFAULT_FILTER)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string())),
        )
        .init();

    log_banner(&config.directory);
    Ok(())
}

fn log_banner(directory: &Path) {
    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("gridtree {} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("Log directory: {}", directory.display());
    tracing::info!("═══════════════════════════════════════════════════════");
}

fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gridtree")
        .join("logs")
}

//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // Remote Table Errors
    // ─────────────────────────────────────────────────────────────
    /// Network failure or non-2xx response on any fetch.
    #[error("API error{}: {message} ({url})", status_suffix(.status))]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The child-table configuration cannot produce a request for this table.
    #[error("Configuration error for table '{table}': {message}")]
    ConfigIntegrity { table: String, message: String },

    /// The response body does not have the `data` / `tableConfig` shape.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ─────────────────────────────────────────────────────────────
    // Grid Errors
    // ─────────────────────────────────────────────────────────────
    /// A UI event names a grid that is not (or no longer) mounted.
    #[error("Grid not mounted: {grid}")]
    GridNotMounted { grid: String },

    /// Only rows of the root table have a base path to delete through.
    #[error("Rows of {grid} cannot be deleted; only root rows can")]
    DeleteUnsupported { grid: String },

    /// A row cannot be expanded without an `id` to address it by.
    #[error("Record in table '{table}' has no id")]
    MissingRecordId { table: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration / Runtime Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The engine's message channel closed while the loop still ran.
    #[error("Message channel closed unexpectedly")]
    ChannelClosed,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" {s}")).unwrap_or_default()
}

/// Coarse classification used when a load error is shown in place of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    ConfigIntegrity,
    MalformedResponse,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::ConfigIntegrity => write!(f, "configuration"),
            ErrorKind::MalformedResponse => write!(f, "malformed response"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn transport(url: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Transport {
            url: url.into(),
            status,
            message: message.into(),
        }
    }

    pub fn config_integrity(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigIntegrity {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn grid_not_mounted(grid: impl std::fmt::Display) -> Self {
        Self::GridNotMounted {
            grid: grid.to_string(),
        }
    }

    pub fn delete_unsupported(grid: impl std::fmt::Display) -> Self {
        Self::DeleteUnsupported {
            grid: grid.to_string(),
        }
    }

    pub fn missing_record_id(table: impl Into<String>) -> Self {
        Self::MissingRecordId {
            table: table.into(),
        }
    }

    /// Classify this error for display next to a failed grid.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport { .. } => ErrorKind::Transport,
            Error::ConfigIntegrity { .. } => ErrorKind::ConfigIntegrity,
            Error::MalformedResponse { .. } | Error::Json(_) => ErrorKind::MalformedResponse,
            _ => ErrorKind::Internal,
        }
    }

    /// Check if the failed operation may simply be triggered again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::MalformedResponse { .. } | Error::Json(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display_with_status() {
        let err = Error::transport("http://x/api/users", Some(404), "Not Found");
        assert_eq!(err.to_string(), "API error 404: Not Found (http://x/api/users)");
    }

    #[test]
    fn test_transport_display_without_status() {
        let err = Error::transport("http://x", None, "connection refused");
        assert_eq!(err.to_string(), "API error: connection refused (http://x)");
    }

    #[test]
    fn test_error_kinds_are_distinct() {
        assert_eq!(
            Error::transport("u", None, "m").kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            Error::config_integrity("orders", "missing route").kind(),
            ErrorKind::ConfigIntegrity
        );
        assert_eq!(Error::malformed("no data").kind(), ErrorKind::MalformedResponse);
        assert_eq!(Error::ChannelClosed.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_config_integrity_is_not_recoverable() {
        assert!(!Error::config_integrity("orders", "missing route").is_recoverable());
        assert!(Error::transport("u", Some(500), "boom").is_recoverable());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

//! Application state (Model in TEA pattern)

use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::Serialize;

use gridtree_core::prelude::*;
use gridtree_remote::ApiProfile;

use crate::config::Settings;
use crate::registry::{GridRegistry, LoadErrorKind, LoadFailure};

/// Most errors kept in the user-visible error channel
const MAX_ERRORS: usize = 100;

/// Lifecycle of the root dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppPhase {
    /// Nothing loaded yet
    #[default]
    Idle,
    /// Root fetch in flight
    LoadingRoot,
    /// Root grid mounted
    Ready,
    /// Root fetch failed; child state is gone
    Failed,
    Quitting,
}

/// An entry in the user-visible error channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserError {
    /// Monotonic sequence number
    pub seq: u64,
    pub kind: LoadErrorKind,
    pub message: String,
    /// What was being done, e.g. `loading root:5/orders`
    pub context: String,
    pub at: DateTime<Local>,
}

/// Complete application state
#[derive(Debug)]
pub struct AppState {
    pub phase: AppPhase,

    /// Loaded settings
    pub settings: Settings,

    /// Connection data in use
    pub profile: ApiProfile,

    /// Endpoint of the current root dataset
    pub endpoint: Option<String>,

    /// Ticket of the root fetch in flight
    pub root_ticket: Option<u64>,

    /// Mounted grids, expansions and slot state
    pub registry: GridRegistry,

    /// User-visible errors, oldest first
    pub errors: Vec<UserError>,

    /// Sequence number of the last reported error
    pub error_seq: u64,

    pub project_path: PathBuf,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(PathBuf::from("."), Settings::default(), ApiProfile::default())
    }

    pub fn with_settings(project_path: PathBuf, settings: Settings, profile: ApiProfile) -> Self {
        Self {
            phase: AppPhase::Idle,
            settings,
            profile,
            endpoint: None,
            root_ticket: None,
            registry: GridRegistry::new(),
            errors: Vec::new(),
            error_seq: 0,
            project_path,
        }
    }

    /// Push an error onto the user-visible channel.
    pub fn report_error(&mut self, failure: &LoadFailure, context: impl Into<String>) {
        let context = context.into();
        error!("{} failed ({}): {}", context, failure.kind, failure.message);

        self.error_seq += 1;
        self.errors.push(UserError {
            seq: self.error_seq,
            kind: failure.kind,
            message: failure.message.clone(),
            context,
            at: Local::now(),
        });
        if self.errors.len() > MAX_ERRORS {
            self.errors.remove(0);
        }
    }

    /// Drop the oldest error.
    pub fn dismiss_error(&mut self) -> Option<UserError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.remove(0))
        }
    }

    /// Errors reported after sequence number `seq`.
    pub fn errors_since(&self, seq: u64) -> impl Iterator<Item = &UserError> {
        self.errors.iter().filter(move |e| e.seq > seq)
    }

    pub fn should_quit(&self) -> bool {
        self.phase == AppPhase::Quitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtree_core::ErrorKind;

    #[test]
    fn test_report_error_sequences() {
        let mut state = AppState::new();
        let failure = LoadFailure::new(ErrorKind::Transport, "boom");

        state.report_error(&failure, "loading root");
        state.report_error(&failure, "loading orders");

        assert_eq!(state.errors.len(), 2);
        assert_eq!(state.errors_since(1).count(), 1);
        assert_eq!(state.errors[1].context, "loading orders");
    }

    #[test]
    fn test_error_channel_is_bounded() {
        let mut state = AppState::new();
        let failure = LoadFailure::new(ErrorKind::Transport, "boom");
        for _ in 0..(MAX_ERRORS + 5) {
            state.report_error(&failure, "x");
        }
        assert_eq!(state.errors.len(), MAX_ERRORS);
        assert_eq!(state.errors[0].seq, 6);
    }

    #[test]
    fn test_dismiss_error_removes_oldest() {
        let mut state = AppState::new();
        state.report_error(&LoadFailure::new(ErrorKind::Transport, "a"), "first");
        state.report_error(&LoadFailure::new(ErrorKind::Transport, "b"), "second");

        assert_eq!(state.dismiss_error().unwrap().context, "first");
        assert_eq!(state.errors.len(), 1);
        assert!(state.dismiss_error().is_some());
        assert!(state.dismiss_error().is_none());
    }
}

//! Configuration types for gridtree
//!
//! Defines:
//! - `Settings` - Global application settings
//! - `BehaviorSettings` - Orchestrator behavior switches
//!
//! Connection data per profile is [`ApiProfile`] from `gridtree-remote`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gridtree_remote::ApiProfile;

/// Global settings from `.gridtree/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Profile used when none is chosen on the command line
    #[serde(default)]
    pub active_profile: Option<String>,

    #[serde(default)]
    pub profiles: BTreeMap<String, ApiProfile>,

    #[serde(default)]
    pub behavior: BehaviorSettings,
}

impl Settings {
    /// Resolve a profile by name, falling back to `active_profile`, then to
    /// the only configured profile, then to defaults.
    pub fn profile(&self, name: Option<&str>) -> ApiProfile {
        let wanted = name.or(self.active_profile.as_deref());
        if let Some(wanted) = wanted {
            if let Some(profile) = self.profiles.get(wanted) {
                return profile.clone();
            }
            tracing::warn!("Profile '{}' not found, using defaults", wanted);
            return ApiProfile::default();
        }

        match self.profiles.len() {
            1 => self.profiles.values().next().cloned().unwrap_or_default(),
            _ => ApiProfile::default(),
        }
    }

    /// The active profile with the environment token override applied.
    pub fn active_profile(&self) -> ApiProfile {
        self.resolve_profile(None)
    }

    /// Resolve `name` (see [`Settings::profile`]) and apply `GRIDTREE_TOKEN`.
    pub fn resolve_profile(&self, name: Option<&str>) -> ApiProfile {
        let mut profile = self.profile(name);
        if let Ok(token) = std::env::var(super::TOKEN_ENV) {
            if !token.is_empty() {
                profile.auth_token = token;
            }
        }
        profile
    }
}

/// Orchestrator behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BehaviorSettings {
    /// Load the root endpoint as soon as the engine starts
    #[serde(default = "default_true")]
    pub auto_load: bool,

    /// Activate a row's first tab when it is expanded
    #[serde(default = "default_true")]
    pub auto_activate_first_tab: bool,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_load: true,
            auto_activate_first_tab: true,
        }
    }
}

fn default_true() -> bool {
    true
}

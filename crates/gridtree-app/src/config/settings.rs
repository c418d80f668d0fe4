//! Settings parser for .gridtree/config.toml

use std::path::Path;

use gridtree_core::prelude::*;

use super::types::Settings;

pub const CONFIG_FILENAME: &str = "config.toml";
pub const GRIDTREE_DIR: &str = ".gridtree";

/// Environment variable that overrides the active profile's bearer token
pub const TOKEN_ENV: &str = "GRIDTREE_TOKEN";

/// Load settings from `.gridtree/config.toml`.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(GRIDTREE_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create `.gridtree/config.toml` with commented defaults if it is missing
pub fn init_config_dir(project_path: &Path) -> Result<()> {
    let gridtree_dir = project_path.join(GRIDTREE_DIR);

    if !gridtree_dir.exists() {
        std::fs::create_dir_all(&gridtree_dir)
            .map_err(|e| Error::config(format!("Failed to create .gridtree dir: {}", e)))?;
    }

    let config_path = gridtree_dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# gridtree configuration

# Profile used when --profile is not given
active_profile = "local"

[profiles.local]
base_url = "http://localhost/api/"
default_endpoint = "user-management/roles"
auth_token = ""              # or set GRIDTREE_TOKEN
# csrf_token = ""            # sent as X-CSRF-TOKEN on delete
# timeout_secs = 30          # no timeout when unset

[behavior]
auto_load = true                 # load the root endpoint on start
auto_activate_first_tab = true   # open the first child tab on row expansion
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(())
}

//! API profile: where requests go and which credential they carry
//!
//! Profile selection and storage live in the application's settings; this
//! type is only the resolved connection data.

use serde::{Deserialize, Serialize};
use url::Url;

use gridtree_core::prelude::*;

/// Resolved connection settings for one API.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiProfile {
    /// Prefix for relative endpoints and routes (should end with `/`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Endpoint loaded when none is given
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,

    /// Bearer credential attached to every request
    #[serde(default)]
    pub auth_token: String,

    /// Anti-forgery token sent with delete requests
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Per-request timeout; no timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiProfile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_endpoint: default_endpoint(),
            auth_token: String::new(),
            csrf_token: None,
            timeout_secs: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost/api/".to_string()
}

fn default_endpoint() -> String {
    "user-management/roles".to_string()
}

impl ApiProfile {
    /// Check that `base_url` is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("invalid base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    /// Full URL for an endpoint or route.
    ///
    /// Values that already start with `http` are used as-is; anything else is
    /// appended to `base_url`.
    pub fn build_api_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http") {
            return endpoint.to_string();
        }
        format!("{}{}", self.base_url, endpoint)
    }

    /// Headers sent with every request.
    pub fn request_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("bearer {}", self.auth_token)),
        ]
    }
}

/// `endpoint` without its query string; the base path for row operations.
pub fn strip_query(endpoint: &str) -> &str {
    endpoint.split('?').next().unwrap_or(endpoint)
}

/// Web (non-API) route for an API URL: drops `/api/` and the query string.
pub fn web_route(api_url: &str) -> String {
    strip_query(&api_url.replacen("/api/", "/", 1)).to_string()
}

/// Page that shows one record of the table behind `api_url`.
pub fn view_url(api_url: &str, id: &str) -> String {
    format!("{}/{}", web_route(api_url), id)
}

/// Page that edits one record of the table behind `api_url`.
pub fn edit_url(api_url: &str, id: &str) -> String {
    format!("{}/edit/{}", web_route(api_url), id)
}

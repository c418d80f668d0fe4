//! reqwest-backed [`Transport`]

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;

use gridtree_core::prelude::*;

use crate::profile::ApiProfile;
use crate::transport::Transport;

/// Anti-forgery header name expected by the server.
pub const CSRF_HEADER: &str = "X-CSRF-TOKEN";

/// Longest response excerpt kept in an error message.
const ERROR_BODY_EXCERPT: usize = 200;

/// HTTP transport carrying the profile's bearer credential.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(profile: &ApiProfile) -> Result<Self> {
        let mut builder = Client::builder().default_headers(default_headers(profile)?);
        if let Some(secs) = profile.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

/// The profile's per-request headers as a reqwest header map.
fn default_headers(profile: &ApiProfile) -> Result<HeaderMap> {
    profile
        .request_headers()
        .into_iter()
        .map(|(name, value)| -> Result<(HeaderName, HeaderValue)> {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| Error::config(format!("invalid value for header {name}: {e}")))?;
            Ok((name, value))
        })
        .collect()
}

/// Turn a reqwest response into the JSON body or a described error.
async fn read_json(url: &str, response: Response) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| Error::transport(url, Some(status.as_u16()), e.to_string()))?;

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("request failed");
        let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT).collect();
        let message = if excerpt.trim().is_empty() {
            reason.to_string()
        } else {
            format!("{reason}: {excerpt}")
        };
        return Err(Error::transport(url, Some(status.as_u16()), message));
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::malformed(format!("response from {url} is not JSON: {e}")))
}

impl Transport for HttpTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e.status().map(|s| s.as_u16()), e.to_string()))?;

        read_json(url, response).await
    }

    async fn delete(&self, url: &str, csrf_token: Option<&str>) -> Result<Value> {
        debug!("DELETE {}", url);
        let mut request = self.client.delete(url);
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(url, e.status().map(|s| s.as_u16()), e.to_string()))?;

        read_json(url, response).await
    }
}

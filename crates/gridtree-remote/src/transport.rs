//! Abstract fetch-by-URL transport
//!
//! The loader only needs "GET this URL as JSON" and "DELETE this URL". The
//! HTTP implementation lives in [`crate::http`]; tests use
//! `test_utils::MockTransport`.

use serde_json::Value;

use gridtree_core::prelude::*;

/// Fetch-by-URL operations used by the loader
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// GET `url` and return the parsed JSON body.
    ///
    /// Network failures and non-2xx statuses are [`Error::Transport`]; a
    /// body that is not JSON is [`Error::MalformedResponse`].
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// DELETE `url`, sending `csrf_token` as the anti-forgery header when
    /// one is available. Returns the acknowledgement body (`Null` if empty).
    async fn delete(&self, url: &str, csrf_token: Option<&str>) -> Result<Value>;
}

/// Source of the hosting session's anti-forgery token.
pub trait CsrfSource: Send + Sync {
    fn csrf_token(&self) -> Option<String>;
}

/// A token fixed at startup (from the active profile).
#[derive(Debug, Clone, Default)]
pub struct StaticCsrfToken(pub Option<String>);

impl CsrfSource for StaticCsrfToken {
    fn csrf_token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl<F> CsrfSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn csrf_token(&self) -> Option<String> {
        self()
    }
}

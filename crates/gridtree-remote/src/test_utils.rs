//! Test utilities for the remote loader
//!
//! Provides [`MockTransport`], an in-memory [`Transport`] that serves canned
//! JSON bodies per URL and records every request it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use gridtree_core::prelude::*;

use crate::transport::Transport;

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Get { url: String },
    Delete { url: String, csrf_token: Option<String> },
}

impl MockCall {
    pub fn url(&self) -> &str {
        match self {
            MockCall::Get { url } | MockCall::Delete { url, .. } => url,
        }
    }
}

#[derive(Debug, Clone)]
enum Canned {
    Body(Value),
    Fail { status: Option<u16>, message: String },
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<String, Canned>,
    calls: Vec<MockCall>,
}

/// Cloneable in-memory transport; clones share routes and call history.
///
/// Unknown URLs fail with a 404 transport error.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for GET and DELETE requests to `url`.
    pub fn respond(&self, url: impl Into<String>, body: Value) -> &Self {
        self.lock().routes.insert(url.into(), Canned::Body(body));
        self
    }

    /// Fail requests to `url` with a transport error.
    pub fn fail(&self, url: impl Into<String>, status: Option<u16>, message: &str) -> &Self {
        self.lock().routes.insert(
            url.into(),
            Canned::Fail {
                status,
                message: message.to_string(),
            },
        );
        self
    }

    /// All requests seen so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of GET requests made for `url`.
    pub fn get_count(&self, url: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, MockCall::Get { url: u } if u == url))
            .count()
    }

    /// Total number of requests made.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only happens after a test already panicked.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn serve(&self, call: MockCall) -> Result<Value> {
        let mut inner = self.lock();
        let url = call.url().to_string();
        inner.calls.push(call);
        match inner.routes.get(&url) {
            Some(Canned::Body(body)) => Ok(body.clone()),
            Some(Canned::Fail { status, message }) => {
                Err(Error::transport(url, *status, message.clone()))
            }
            None => Err(Error::transport(url, Some(404), "Not Found")),
        }
    }
}

impl Transport for MockTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.serve(MockCall::Get {
            url: url.to_string(),
        })
    }

    async fn delete(&self, url: &str, csrf_token: Option<&str>) -> Result<Value> {
        self.serve(MockCall::Delete {
            url: url.to_string(),
            csrf_token: csrf_token.map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_serves_canned_body_and_records_call() {
        let mock = MockTransport::new();
        mock.respond("http://h/api/a", json!({"data": []}));

        let body = mock.get_json("http://h/api/a").await.unwrap();
        assert_eq!(body, json!({"data": []}));
        assert_eq!(mock.get_count("http://h/api/a"), 1);
    }

    #[tokio::test]
    async fn test_mock_unknown_url_is_404() {
        let mock = MockTransport::new();
        let err = mock.get_json("http://h/missing").await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(404), .. }));
    }

    #[tokio::test]
    async fn test_mock_clones_share_history() {
        let mock = MockTransport::new();
        let clone = mock.clone();
        clone.fail("u", Some(500), "boom");

        assert!(mock.get_json("u").await.is_err());
        assert_eq!(clone.call_count(), 1);
    }
}

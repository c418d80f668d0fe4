//! Remote Table Loader
//!
//! Request/response functions over a [`Transport`]: fetch the root dataset,
//! fetch one child table for one parent record, delete a row. The loader
//! holds no dataset state; caching is the orchestrator's business.

use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::Value;

use gridtree_core::prelude::*;
use gridtree_core::{scalar_to_string, ChildTableNode, Record};

use crate::profile::{strip_query, ApiProfile};
use crate::response::{decompose, ResponseShape, TableResponse};
use crate::transport::{CsrfSource, StaticCsrfToken, Transport};

/// Characters escaped when a relation value is appended to a route.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Build the URL for one child table of `parent`.
///
/// Fails with [`Error::ConfigIntegrity`] when the node has no `route` or no
/// `relationKeyTo`, or when `parent` lacks the relation field. A node that
/// still uses the old `relationKey` spelling gets a migration hint.
pub fn child_url(table_name: &str, node: &ChildTableNode, parent: &Record) -> Result<String> {
    let route = node
        .route
        .as_deref()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| Error::config_integrity(table_name, "child table has no route"))?;

    let relation_key = match (node.relation_key_to.as_deref(), node.legacy_relation_key.as_deref()) {
        (Some(key), _) if !key.is_empty() => key,
        (_, Some(legacy)) => {
            return Err(Error::config_integrity(
                table_name,
                format!("uses 'relationKey: {legacy}'; rename it to 'relationKeyTo'"),
            ))
        }
        _ => {
            return Err(Error::config_integrity(
                table_name,
                "child table has no relationKeyTo",
            ))
        }
    };

    let value = parent.get(relation_key).ok_or_else(|| {
        Error::config_integrity(
            table_name,
            format!("parent record has no '{relation_key}' field"),
        )
    })?;

    let segment = scalar_to_string(value);
    Ok(format!(
        "{}{}",
        route,
        utf8_percent_encode(&segment, PATH_SEGMENT)
    ))
}

/// Loads tables through a [`Transport`] using one [`ApiProfile`].
pub struct TableLoader<T> {
    transport: T,
    profile: ApiProfile,
    csrf: Arc<dyn CsrfSource>,
}

impl<T: Transport> TableLoader<T> {
    pub fn new(transport: T, profile: ApiProfile) -> Self {
        let csrf = Arc::new(StaticCsrfToken(profile.csrf_token.clone()));
        Self {
            transport,
            profile,
            csrf,
        }
    }

    /// Replace the anti-forgery token source (defaults to the profile's token).
    pub fn with_csrf_source(mut self, csrf: Arc<dyn CsrfSource>) -> Self {
        self.csrf = csrf;
        self
    }

    pub fn profile(&self) -> &ApiProfile {
        &self.profile
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the root dataset.
    pub async fn load_root(&self, endpoint: &str) -> Result<TableResponse> {
        let url = self.profile.build_api_url(endpoint);
        info!("Loading root table from {}", url);
        let body = self.transport.get_json(&url).await?;
        decompose(body, ResponseShape::Root)
    }

    /// Fetch `table_name`'s rows for one parent record.
    ///
    /// Configuration problems are reported before any request is made.
    pub async fn load_child(
        &self,
        table_name: &str,
        node: &ChildTableNode,
        parent: &Record,
    ) -> Result<TableResponse> {
        let url = self
            .profile
            .build_api_url(&child_url(table_name, node, parent)?);
        info!("Loading child table '{}' from {}", table_name, url);
        let body = self.transport.get_json(&url).await?;
        decompose(body, ResponseShape::Child)
    }

    /// Delete one row: `DELETE <table_base_path>/delete/<id>`.
    ///
    /// Any query string on `table_base_path` is dropped. Local state is not
    /// touched; callers reload on success.
    pub async fn delete_row(&self, id: &str, table_base_path: &str) -> Result<Value> {
        let base = self.profile.build_api_url(strip_query(table_base_path));
        let url = format!(
            "{}/delete/{}",
            base.trim_end_matches('/'),
            utf8_percent_encode(id, PATH_SEGMENT)
        );

        let token = self.csrf.csrf_token();
        if token.is_none() {
            warn!("Deleting without an anti-forgery token: {}", url);
        }
        info!("Deleting row {} via {}", id, url);
        self.transport.delete(&url, token.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> ChildTableNode {
        serde_json::from_value(value).unwrap()
    }

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_child_url_appends_relation_value() {
        let n = node(json!({"route": "api/orders/by-user/", "relationKeyTo": "user_id"}));
        let url = child_url("orders", &n, &record(json!({"user_id": 5}))).unwrap();
        assert_eq!(url, "api/orders/by-user/5");
    }

    #[test]
    fn test_child_url_escapes_value() {
        let n = node(json!({"route": "r/", "relationKeyTo": "code"}));
        let url = child_url("t", &n, &record(json!({"code": "a/b c"}))).unwrap();
        assert_eq!(url, "r/a%2Fb%20c");
    }

    #[test]
    fn test_child_url_null_value_is_present() {
        let n = node(json!({"route": "r/", "relationKeyTo": "k"}));
        assert_eq!(
            child_url("t", &n, &record(json!({"k": null}))).unwrap(),
            "r/null"
        );
    }

    #[test]
    fn test_child_url_missing_parent_field() {
        let n = node(json!({"route": "r/", "relationKeyTo": "user_id"}));
        let err = child_url("orders", &n, &record(json!({"id": 1}))).unwrap_err();
        assert!(matches!(err, Error::ConfigIntegrity { ref table, .. } if table == "orders"));
    }

    #[test]
    fn test_child_url_missing_route_or_key() {
        let no_route = node(json!({"relationKeyTo": "id"}));
        assert!(matches!(
            child_url("t", &no_route, &record(json!({"id": 1}))),
            Err(Error::ConfigIntegrity { .. })
        ));

        let no_key = node(json!({"route": "r/"}));
        assert!(matches!(
            child_url("t", &no_key, &record(json!({"id": 1}))),
            Err(Error::ConfigIntegrity { .. })
        ));
    }

    #[test]
    fn test_child_url_legacy_relation_key_needs_migration() {
        let legacy = node(json!({"route": "r/", "relationKey": "id"}));
        let err = child_url("t", &legacy, &record(json!({"id": 1}))).unwrap_err();
        assert!(err.to_string().contains("relationKeyTo"));
    }

    // ─────────────────────────────────────────────────────────
    // Loader against the mock transport
    // ─────────────────────────────────────────────────────────

    use crate::test_utils::{MockCall, MockTransport};

    fn loader(mock: &MockTransport) -> TableLoader<MockTransport> {
        let profile = ApiProfile {
            base_url: "http://h/api/".to_string(),
            csrf_token: Some("csrf-1".to_string()),
            ..Default::default()
        };
        TableLoader::new(mock.clone(), profile)
    }

    #[tokio::test]
    async fn test_load_root_decomposes_body() {
        let mock = MockTransport::new();
        mock.respond(
            "http://h/api/users",
            json!({
                "data": [{"id": 5, "name": "Ann"}],
                "tableConfig": {
                    "columnDefs": [{"field": "name"}],
                    "childTableTree": {"orders": {"route": "orders/by-user/", "relationKeyTo": "id"}}
                }
            }),
        );

        let response = loader(&mock).load_root("users").await.unwrap();
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.child_tree.names().collect::<Vec<_>>(), vec!["orders"]);
        assert_eq!(mock.get_count("http://h/api/users"), 1);
    }

    #[tokio::test]
    async fn test_load_child_requests_route_plus_value() {
        let mock = MockTransport::new();
        mock.respond(
            "http://h/api/orders/by-user/5",
            json!({"data": [{"id": 9, "total": 12.5}]}),
        );
        let n = node(json!({"route": "orders/by-user/", "relationKeyTo": "id"}));

        let response = loader(&mock)
            .load_child("orders", &n, &record(json!({"id": 5})))
            .await
            .unwrap();
        assert_eq!(response.rows[0]["total"], json!(12.5));
        assert!(response.child_tree.is_empty());
    }

    #[tokio::test]
    async fn test_load_child_config_error_makes_no_request() {
        let mock = MockTransport::new();
        let n = node(json!({"route": "orders/by-user/", "relationKeyTo": "user_id"}));

        let err = loader(&mock)
            .load_child("orders", &n, &record(json!({"id": 5})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), gridtree_core::ErrorKind::ConfigIntegrity);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_load_child_transport_failure() {
        let mock = MockTransport::new();
        mock.fail("http://h/api/r/1", Some(500), "Internal Server Error");
        let n = node(json!({"route": "r/", "relationKeyTo": "id"}));

        let err = loader(&mock)
            .load_child("t", &n, &record(json!({"id": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_delete_row_strips_query_and_sends_token() {
        let mock = MockTransport::new();
        mock.respond("http://h/api/users/delete/7", json!({"success": true}));

        tokio_test::assert_ok!(loader(&mock).delete_row("7", "users?page=2").await);
        assert_eq!(
            mock.calls(),
            vec![MockCall::Delete {
                url: "http://h/api/users/delete/7".to_string(),
                csrf_token: Some("csrf-1".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_delete_row_uses_custom_csrf_source() {
        let mock = MockTransport::new();
        mock.respond("http://h/api/users/delete/7", Value::Null);
        let source: Arc<dyn CsrfSource> = Arc::new(|| Some("fresh".to_string()));

        loader(&mock)
            .with_csrf_source(source)
            .delete_row("7", "http://h/api/users/")
            .await
            .unwrap();
        assert!(matches!(
            &mock.calls()[0],
            MockCall::Delete { csrf_token: Some(t), .. } if t == "fresh"
        ));
    }
}

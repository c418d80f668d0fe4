//! Server-supplied table configuration: column definitions, page naming and
//! the recursive child-table tree.
//!
//! Everything here is deserialized leniently. Unknown keys are ignored and
//! optional keys may be missing; integrity problems are reported when a
//! node is actually used (see `gridtree_remote::loader`).

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Display naming for a table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    #[serde(default)]
    pub singular_name: Option<String>,
    #[serde(default)]
    pub plural_name: Option<String>,
}

/// One declarative column entry, in the server's grid-column dialect.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub header_name: Option<String>,
    #[serde(default)]
    pub header_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_width")]
    pub width: Option<u32>,
    #[serde(default)]
    pub hide: bool,
    /// `true`, or any truthy value
    #[serde(default)]
    pub sortable: Option<Value>,
    /// `true`, a filter type name, or any truthy value
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub cell_renderer: Option<String>,
    /// Expression such as `data.role ? data.role.name : data.role_id`
    #[serde(default)]
    pub value_getter: Option<String>,
}

impl ColumnDef {
    pub fn is_sortable(&self) -> bool {
        self.sortable.as_ref().is_some_and(truthy)
    }

    pub fn is_filterable(&self) -> bool {
        self.filter.as_ref().is_some_and(truthy)
    }
}

/// JavaScript-style truthiness, which is what the column dialect assumes.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Accept `120`, `120.0` or `"120"`; anything else means "use the default".
fn lenient_width<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|w| u32::try_from(w).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|w| *w > 0))
}

/// An object, or nothing. PHP backends send an empty `pageConfig` as `[]`.
fn lenient_page_config<'de, D>(deserializer: D) -> Result<Option<PageConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value)
            .map(Some)
            .map_err(D::Error::custom),
        _ => Ok(None),
    }
}

/// Table-level configuration block (`tableConfig`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    #[serde(default)]
    pub column_defs: Option<Vec<ColumnDef>>,
    #[serde(default)]
    pub child_table_tree: Option<ChildTableTree>,
    #[serde(default, deserialize_with = "lenient_page_config")]
    pub page_config: Option<PageConfig>,
}

/// One entry in the child-table configuration tree.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildTableNode {
    /// URL prefix; the parent's relation value is appended to it.
    #[serde(default)]
    pub route: Option<String>,
    /// Field on the *parent* record whose value parameterizes `route`.
    #[serde(default)]
    pub relation_key_to: Option<String>,
    /// Pre-`relationKeyTo` spelling. Only read to report a migration error.
    #[serde(default, rename = "relationKey", skip_serializing)]
    pub legacy_relation_key: Option<String>,
    /// Alternate name the table may be addressed by.
    #[serde(default, alias = "relation_name")]
    pub relation_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_page_config")]
    pub page_config: Option<PageConfig>,
    #[serde(default)]
    pub column_defs: Option<Vec<ColumnDef>>,
    #[serde(default)]
    pub table_config: Option<TableConfig>,
    #[serde(default)]
    pub child_tables: ChildTableTree,
}

impl ChildTableNode {
    /// Column definitions declared for this table, wherever the server put them.
    pub fn declared_column_defs(&self) -> Option<&[ColumnDef]> {
        self.column_defs
            .as_deref()
            .or_else(|| {
                self.table_config
                    .as_ref()
                    .and_then(|tc| tc.column_defs.as_deref())
            })
    }

    pub fn plural_name(&self) -> Option<&str> {
        self.page_config
            .as_ref()
            .and_then(|pc| pc.plural_name.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn has_children(&self) -> bool {
        !self.child_tables.is_empty()
    }
}

/// Ordered mapping of table name to its configuration.
///
/// Key order is the server's order and determines tab order. `null` and an
/// empty array (how PHP encodes an empty map) both read as an empty tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChildTableTree(IndexMap<String, ChildTableNode>);

impl<'de> Deserialize<'de> for ChildTableTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(entries) => entries
                .into_iter()
                .map(|(name, node)| match serde_json::from_value::<ChildTableNode>(node) {
                    Ok(node) => Ok((name, node)),
                    Err(e) => Err(D::Error::custom(format!("child table '{name}': {e}"))),
                })
                .collect(),
            Value::Null => Ok(Self::new()),
            Value::Array(items) if items.is_empty() => Ok(Self::new()),
            other => Err(D::Error::custom(format!(
                "expected a map of child tables, got {}",
                json_type(&other)
            ))),
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a non-empty array",
        Value::Object(_) => "an object",
    }
}

impl ChildTableTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, table_name: &str) -> Option<&ChildTableNode> {
        self.0.get(table_name)
    }

    pub fn get_index(&self, index: usize) -> Option<(&String, &ChildTableNode)> {
        self.0.get_index(index)
    }

    pub fn insert(&mut self, table_name: impl Into<String>, node: ChildTableNode) {
        self.0.insert(table_name.into(), node);
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ChildTableNode> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, ChildTableNode)> for ChildTableTree {
    fn from_iter<I: IntoIterator<Item = (String, ChildTableNode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ChildTableTree {
    type Item = (&'a String, &'a ChildTableNode);
    type IntoIter = indexmap::map::Iter<'a, String, ChildTableNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tree_preserves_server_order() {
        let tree: ChildTableTree = serde_json::from_value(json!({
            "zeta": {"route": "/z/"},
            "alpha": {"route": "/a/"},
            "mid": {"route": "/m/"}
        }))
        .unwrap();

        assert_eq!(tree.names().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_node_deserializes_nested_children() {
        let node: ChildTableNode = serde_json::from_value(json!({
            "route": "api/orders/by-user/",
            "relationKeyTo": "id",
            "pageConfig": {"singularName": "Order", "pluralName": "Orders"},
            "childTables": {
                "items": {"route": "api/items/by-order/", "relationKeyTo": "id"}
            }
        }))
        .unwrap();

        assert_eq!(node.route.as_deref(), Some("api/orders/by-user/"));
        assert_eq!(node.plural_name(), Some("Orders"));
        assert!(node.has_children());
        assert!(node.child_tables.get("items").is_some());
    }

    #[test]
    fn test_empty_array_and_null_read_as_empty_tree() {
        let node: ChildTableNode = serde_json::from_value(json!({
            "route": "api/orders/by-user/",
            "relationKeyTo": "id",
            "pageConfig": [],
            "childTables": []
        }))
        .unwrap();
        assert!(!node.has_children());
        assert_eq!(node.page_config, None);

        let node: ChildTableNode =
            serde_json::from_value(json!({"route": "/x/", "childTables": null})).unwrap();
        assert!(!node.has_children());

        let tree: ChildTableTree = serde_json::from_value(json!([])).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_non_empty_array_tree_is_rejected() {
        let err = serde_json::from_value::<ChildTableTree>(json!([{"route": "/x/"}])).unwrap_err();
        assert!(err.to_string().contains("expected a map of child tables"));
    }

    #[test]
    fn test_legacy_relation_key_is_kept_apart() {
        let node: ChildTableNode =
            serde_json::from_value(json!({"route": "/x/", "relationKey": "user_id"})).unwrap();
        assert_eq!(node.relation_key_to, None);
        assert_eq!(node.legacy_relation_key.as_deref(), Some("user_id"));
    }

    #[test]
    fn test_relation_name_snake_case_alias() {
        let node: ChildTableNode =
            serde_json::from_value(json!({"relation_name": "roleUsers"})).unwrap();
        assert_eq!(node.relation_name.as_deref(), Some("roleUsers"));
    }

    #[test]
    fn test_declared_column_defs_fallback_to_table_config() {
        let node: ChildTableNode = serde_json::from_value(json!({
            "tableConfig": {"columnDefs": [{"field": "name"}]}
        }))
        .unwrap();
        let defs = node.declared_column_defs().unwrap();
        assert_eq!(defs[0].field.as_deref(), Some("name"));
    }

    #[test]
    fn test_column_def_truthiness() {
        let def: ColumnDef = serde_json::from_value(json!({
            "field": "name",
            "sortable": true,
            "filter": "agTextColumnFilter"
        }))
        .unwrap();
        assert!(def.is_sortable());
        assert!(def.is_filterable());

        let def: ColumnDef =
            serde_json::from_value(json!({"field": "x", "filter": false})).unwrap();
        assert!(!def.is_sortable());
        assert!(!def.is_filterable());
    }

    #[test]
    fn test_column_def_lenient_width() {
        let def: ColumnDef = serde_json::from_value(json!({"width": "150"})).unwrap();
        assert_eq!(def.width, Some(150));
        let def: ColumnDef = serde_json::from_value(json!({"width": 90.4})).unwrap();
        assert_eq!(def.width, Some(90));
        let def: ColumnDef = serde_json::from_value(json!({"width": "wide"})).unwrap();
        assert_eq!(def.width, None);
    }
}

//! Records: opaque, ordered field maps as delivered by the API
//!
//! A record is a JSON object. Fields whose value is neither an object nor an
//! array are *info fields* and are displayed as labeled text. Child tables
//! are never discovered from array-valued fields; that comes from the
//! [`ChildTableTree`](crate::ChildTableTree).

use serde_json::Value;

/// A single row as returned by the API, in server key order.
pub type Record = serde_json::Map<String, Value>;

/// Field carrying pre-rendered action markup for a row.
pub const ACTION_COLUMN_FIELD: &str = "action_column";

/// Internal action fields that are never shown as data.
pub const ACTION_FIELDS: &[&str] = &[
    ACTION_COLUMN_FIELD,
    "action_view",
    "action_modify",
    "action_delete",
];

/// Whether `field` is one of the internal action fields.
pub fn is_action_field(field: &str) -> bool {
    ACTION_FIELDS.contains(&field)
}

/// Whether `value` is displayed as a plain info field.
pub fn is_info_value(value: &Value) -> bool {
    !matches!(value, Value::Object(_) | Value::Array(_))
}

/// Info fields of a record (scalars, including null), in record order.
pub fn info_fields(record: &Record) -> impl Iterator<Item = (&String, &Value)> {
    record.iter().filter(|(_, value)| is_info_value(value))
}

/// Render a scalar for use inside a URL or an identity key.
///
/// Strings are used verbatim (no quotes); every other value uses its JSON
/// form, so `null` becomes `"null"` and `5` becomes `"5"`.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The record's `id` field as a string, if present and scalar.
pub fn record_id(record: &Record) -> Option<String> {
    record
        .get("id")
        .filter(|value| is_info_value(value) && !value.is_null())
        .map(scalar_to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_info_fields_skip_objects_and_arrays() {
        let rec = record(json!({
            "id": 1,
            "name": "Ada",
            "role": {"name": "admin"},
            "tags": ["a", "b"],
            "deleted_at": null
        }));

        let fields: Vec<&str> = info_fields(&rec).map(|(k, _)| k.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "deleted_at"]);
    }

    #[test]
    fn test_record_id_number_and_string() {
        assert_eq!(record_id(&record(json!({"id": 5}))), Some("5".to_string()));
        assert_eq!(
            record_id(&record(json!({"id": "abc"}))),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_record_id_missing_or_null() {
        assert_eq!(record_id(&record(json!({"name": "x"}))), None);
        assert_eq!(record_id(&record(json!({"id": null}))), None);
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("x")), "x");
        assert_eq!(scalar_to_string(&json!(5)), "5");
        assert_eq!(scalar_to_string(&json!(true)), "true");
        assert_eq!(scalar_to_string(&Value::Null), "null");
    }

    #[test]
    fn test_is_action_field() {
        assert!(is_action_field("action_column"));
        assert!(is_action_field("action_delete"));
        assert!(!is_action_field("actions"));
    }
}

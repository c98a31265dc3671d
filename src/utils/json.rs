//! Dot-path helpers over `serde_json::Value`
//!
//! Used by condition evaluation (`resource.ownerId`) and the settings cascade
//! (`modules.loyalty.enabled`). Numeric segments index into arrays.

use serde_json::{Map, Value};

/// Follow a dot-separated path. Returns `None` when any segment is missing.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }

    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Like [`lookup_path`], but an explicit `null` counts as absent.
pub fn lookup_present<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    lookup_path(root, path).filter(|v| !v.is_null())
}

/// Write `value` at `path`, creating intermediate objects as needed.
///
/// Non-object intermediates are replaced by objects.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return;
    };

    let mut current = root;
    for segment in parents {
        current = ensure_object(current)
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(current).insert((*last).to_string(), value);
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// Render a scalar as a string key. Objects contribute their `id` field.
pub fn as_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("id").or_else(|| map.get("_id")).and_then(as_key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let doc = json!({"modules": {"loyalty": {"enabled": false}}, "tags": ["a", "b"]});
        assert_eq!(lookup_path(&doc, "modules.loyalty.enabled"), Some(&json!(false)));
        assert_eq!(lookup_path(&doc, "tags.1"), Some(&json!("b")));
        assert_eq!(lookup_path(&doc, "modules.points"), None);
        assert_eq!(lookup_path(&doc, "tags.x"), None);
    }

    #[test]
    fn test_lookup_present_skips_null() {
        let doc = json!({"currency": null, "tax": 0});
        assert_eq!(lookup_present(&doc, "currency"), None);
        assert_eq!(lookup_present(&doc, "tax"), Some(&json!(0)));
    }

    #[test]
    fn test_set_path_creates_parents() {
        let mut doc = json!({"modules": "legacy"});
        set_path(&mut doc, "modules.loyalty.enabled", json!(true));
        assert_eq!(doc, json!({"modules": {"loyalty": {"enabled": true}}}));

        let mut empty = Value::Null;
        set_path(&mut empty, "currency", json!("IDR"));
        assert_eq!(empty, json!({"currency": "IDR"}));
    }

    #[test]
    fn test_as_key() {
        assert_eq!(as_key(&json!("BU1")), Some("BU1".to_string()));
        assert_eq!(as_key(&json!(42)), Some("42".to_string()));
        assert_eq!(as_key(&json!({"id": "O1", "name": "Main"})), Some("O1".to_string()));
        assert_eq!(as_key(&json!(true)), None);
    }
}

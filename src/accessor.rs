//! Dot-path access over JSON values.
//!
//! Both request-parameter injection and response projection are expressed as
//! dot-paths (e.g. `"request.keyword"`, `"success.result"`). Navigation never
//! panics: a missing segment reads as `None`, and writes create intermediate
//! objects as needed.

use serde_json::{Map, Value};

/// Navigate `root` along a dot-path. Returns `None` on any missing segment.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Navigate `root` along a dot-path, falling back to `default` when any
/// segment is missing.
pub fn get_path_or<'a>(root: &'a Value, path: &str, default: &'a Value) -> &'a Value {
    get_path(root, path).unwrap_or(default)
}

/// Write `value` at a dot-path, creating intermediate objects as needed.
/// Non-object intermediates are replaced by empty objects.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    let mut current = root;
    let mut value = Some(value);
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value.take().unwrap_or(Value::Null));
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Loose string form of a JSON value, mirroring the comparison semantics the
/// external value string uses (numeric ids compare equal to their decimal
/// text form).
pub fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Loose string form of the field at `path`, empty when absent.
pub fn field_string(item: &Value, path: &str) -> String {
    get_path(item, path).map(value_string).unwrap_or_default()
}

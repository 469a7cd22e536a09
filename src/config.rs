//! Picker configuration.
//!
//! Configuration is programmatic: the embedding layer parses whatever
//! attribute/option syntax it has and hands the engine a `PickerConfig`.
//! Remote-source settings live in the optional `RemoteConfig`; a picker
//! without one is purely local.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::navigation::Key;

/// How the display label is extracted from an item: a field name, or a
/// resolver function supplied by the embedder.
#[derive(Clone)]
pub enum LabelAccessor {
    ByField(String),
    ByFunction(Arc<dyn Fn(&Value) -> String + Send + Sync>),
}

impl LabelAccessor {
    /// Resolve the label for an item.
    pub fn resolve(&self, item: &Value) -> String {
        match self {
            LabelAccessor::ByField(field) => crate::accessor::field_string(item, field),
            LabelAccessor::ByFunction(f) => f(item),
        }
    }
}

impl fmt::Debug for LabelAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelAccessor::ByField(field) => f.debug_tuple("ByField").field(field).finish(),
            LabelAccessor::ByFunction(_) => f.debug_tuple("ByFunction").field(&"<fn>").finish(),
        }
    }
}

impl Default for LabelAccessor {
    fn default() -> Self {
        LabelAccessor::ByField("label".to_string())
    }
}

/// Value-vs-text behavior of the derived output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerMode {
    #[default]
    Default,
    /// The external `text` mirrors the derived value (single-select) or the
    /// raw keyword, and `validate()` checks the text instead of the selection.
    Text,
}

/// Remote data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Endpoint for the initial load, keyword search, and value resolution.
    pub src: String,

    /// Static parameter object sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_param: Option<Value>,

    /// Dot-path in the request body where the live keyword or value is
    /// injected (default: `"keyword"`).
    #[serde(default = "default_keyword_path")]
    pub keyword_path: String,

    /// Dot-path extracting the candidate array from the response
    /// (default: the response itself is the array).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,

    /// Minimum interval between keyword-driven fetches.
    #[serde(default = "default_throttle", with = "duration_millis")]
    pub throttle: Duration,
}

fn default_keyword_path() -> String {
    "keyword".to_string()
}

fn default_throttle() -> Duration {
    Duration::from_millis(1000)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

impl RemoteConfig {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            fetch_param: None,
            keyword_path: default_keyword_path(),
            result_path: None,
            throttle: default_throttle(),
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone)]
pub struct PickerConfig {
    /// Field extracting an item's identity (default: `"value"`).
    pub value_field: String,

    /// Field or resolver extracting an item's display label.
    pub label_field: LabelAccessor,

    /// Fields to build search keys from; empty means all top-level fields.
    pub fields_for_index: Vec<String>,

    /// Skip pinyin key generation, indexing raw string forms only.
    pub disable_pinyin_search: bool,

    /// Allow multiple selections.
    pub multi: bool,

    /// Cap on the number of selections. Only gates opening the candidate
    /// panel; programmatic `select` is not blocked.
    pub multi_limit: Option<usize>,

    /// Selection (or, in text mode, text) must be non-empty to validate.
    pub required: bool,

    /// Advisory flag for the embedding layer; the engine does not gate
    /// commands on it.
    pub readonly: bool,

    pub mode: PickerMode,

    /// Key confirming the focused candidate (default: Enter).
    pub confirm_key: Key,

    /// Enable Alt+digit direct selection of visible candidates.
    pub enable_hotkey: bool,

    /// Remote source; `None` means local-only.
    pub remote: Option<RemoteConfig>,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            value_field: "value".to_string(),
            label_field: LabelAccessor::default(),
            fields_for_index: Vec::new(),
            disable_pinyin_search: false,
            multi: false,
            multi_limit: None,
            required: false,
            readonly: false,
            mode: PickerMode::default(),
            confirm_key: Key::Enter,
            enable_hotkey: false,
            remote: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_by_field() {
        let accessor = LabelAccessor::ByField("label".to_string());
        assert_eq!(accessor.resolve(&json!({"label": "北京"})), "北京");
        assert_eq!(accessor.resolve(&json!({})), "");
    }

    #[test]
    fn test_label_by_function() {
        let accessor = LabelAccessor::ByFunction(Arc::new(|item| {
            format!(
                "{} ({})",
                crate::accessor::field_string(item, "label"),
                crate::accessor::field_string(item, "id"),
            )
        }));
        assert_eq!(accessor.resolve(&json!({"id": 1, "label": "a"})), "a (1)");
    }

    #[test]
    fn test_remote_config_defaults() {
        let cfg: RemoteConfig = serde_json::from_value(json!({"src": "/api/list"})).unwrap();
        assert_eq!(cfg.keyword_path, "keyword");
        assert_eq!(cfg.result_path, None);
        assert_eq!(cfg.throttle, Duration::from_millis(1000));
    }

    #[test]
    fn test_remote_config_roundtrip() {
        let cfg = RemoteConfig {
            src: "/api/listProduct".to_string(),
            fetch_param: Some(json!({"request": {"pageRequest": {"limit": 10, "start": 0}}})),
            keyword_path: "request.keyword".to_string(),
            result_path: Some("success.result".to_string()),
            throttle: Duration::from_millis(500),
        };
        let round: RemoteConfig =
            serde_json::from_value(serde_json::to_value(&cfg).unwrap()).unwrap();
        assert_eq!(round.keyword_path, "request.keyword");
        assert_eq!(round.throttle, Duration::from_millis(500));
    }
}

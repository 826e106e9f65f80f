//! Shared test utilities for the attest workspace.
//!
//! Pulled in as a dev-dependency by crates whose tests compare validation reports or
//! profile info across runs.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static GENERATED_NONCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\(generated from [^ ]+:\d+ )[0-9a-f]{32}\)").expect("valid generated id regex")
});

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// 1. **Root-only**: `tool.version` becomes `"__VERSION__"` when the root object is a
///    validation report (`schema`, `tool`, `summary`, `errors`, `warnings`).
/// 2. **Recursive**: `started_at` / `finished_at` become `"__TIMESTAMP__"`, and the random
///    suffix of generated control ids becomes `__NONCE__`, in keys and values alike.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_report = ["schema", "tool", "summary", "errors", "warnings"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_report
            && let Some(tool) = obj.get_mut("tool")
            && let Some(tool_obj) = tool.as_object_mut()
            && tool_obj.contains_key("version")
        {
            tool_obj.insert(
                "version".to_string(),
                Value::String("__VERSION__".to_string()),
            );
        }
    }
    normalize_recursive(&mut value);
    value
}

/// Replace the random part of every generated control id in `text`.
pub fn normalize_generated_ids(text: &str) -> String {
    GENERATED_NONCE
        .replace_all(text, "${1}__NONCE__)")
        .into_owned()
}

fn normalize_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in ["started_at", "finished_at"] {
                if map.contains_key(key) {
                    map.insert(key.to_string(), Value::String("__TIMESTAMP__".to_string()));
                }
            }
            if map.keys().any(|k| GENERATED_NONCE.is_match(k)) {
                let entries = std::mem::take(map);
                for (k, v) in entries {
                    map.insert(normalize_generated_ids(&k), v);
                }
            }
            for val in map.values_mut() {
                normalize_recursive(val);
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_recursive(val);
            }
        }
        Value::String(s) => {
            if GENERATED_NONCE.is_match(s) {
                *s = normalize_generated_ids(s);
            }
        }
        _ => {}
    }
}

//! Deterministic, order-independent serialization of option maps.
//!
//! The host engine decides "needs rerun" by comparing serialized bytes of
//! the prior and current configuration, so the encoding must not depend on
//! the order in which options were set. Keys are sorted lexicographically
//! here, explicitly, rather than by relying on any container's ordering.

use serde_json::Value;

use crate::error::StepError;

/// Canonicalize entries whose values are opaque JSON values.
///
/// Keys are emitted in lexicographic order regardless of insertion order;
/// nested objects are canonicalized recursively with the same rule. The
/// output is a compact JSON object text.
///
/// # Errors
/// Returns `StepError::UnsupportedValue` for null values, and for duplicate
/// keys at any level (two spellings of one option cannot be ordered
/// canonically without silently dropping one).
pub fn canonical_entries(entries: &[(String, Value)]) -> Result<String, StepError> {
    let mut sorted: Vec<(&str, &Value)> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    sorted.sort_by_key(|(k, _)| *k);

    for pair in sorted.windows(2) {
        if let [(a, _), (b, _)] = pair {
            if a == b {
                return Err(StepError::UnsupportedValue {
                    key: (*a).to_owned(),
                    reason: "duplicate key".to_owned(),
                });
            }
        }
    }

    let mut out = String::from("{");
    for (i, (key, value)) in sorted.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&Value::String((*key).to_owned()).to_string());
        out.push(':');
        out.push_str(&canonical_value(key, value)?);
    }
    out.push('}');
    Ok(out)
}

/// Canonicalize plain string-to-string entries (e.g. ktlint user data).
///
/// # Errors
/// Returns `StepError::UnsupportedValue` for duplicate keys.
pub fn canonical_string_entries(entries: &[(String, String)]) -> Result<String, StepError> {
    let owned: Vec<(String, Value)> = entries
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    canonical_entries(&owned)
}

/// Canonicalize a single value, recursing into arrays and objects.
fn canonical_value(key: &str, value: &Value) -> Result<String, StepError> {
    match value {
        Value::Null => Err(StepError::UnsupportedValue {
            key: key.to_owned(),
            reason: "null is not a representable option value".to_owned(),
        }),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(value.to_string()),
        Value::Array(items) => {
            // Lists are ordered data; their element order is significant and kept.
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&canonical_value(key, item)?);
            }
            out.push(']');
            Ok(out)
        }
        Value::Object(map) => {
            let entries: Vec<(String, Value)> =
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            canonical_entries(&entries)
        }
    }
}

//! Canonical JSON serialization used for both signing and content hashing
//! (`spec.md` §4.1).
//!
//! The reference implementation this protocol is modeled on sorts only the
//! top-level keys of an object (`JSON.stringify(obj, Object.keys(obj).sort())`).
//! `spec.md` §9 flags this as an open question and recommends the safer
//! choice: sort keys **recursively**, at every depth, inside arrays too.
//! This module implements that recursive rule uniformly — see `DESIGN.md`
//! for the resolution.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanonicalError {
    #[error("failed to serialize value to JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize `value` to its canonical byte representation: JSON text with
/// every object's keys in ascending lexicographic order at every nesting
/// level. Array element order is preserved as-is.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CanonicalError> {
    let raw = serde_json::to_value(value)?;
    let sorted = sort_recursive(raw);
    Ok(serde_json::to_vec(&sorted)?)
}

fn sort_recursive(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> =
                map.into_iter().map(|(k, v)| (k, sort_recursive(v))).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = serde_json::Map::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k, v);
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_recursive).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Nested {
        z: u32,
        a: Inner,
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Inner {
        b: u32,
        a: u32,
    }

    #[test]
    fn sorts_keys_at_every_depth() {
        let v = Nested {
            z: 1,
            a: Inner { b: 2, a: 3 },
        };
        let bytes = canonical_bytes(&v).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"a":{"a":3,"b":2},"z":1}"#);
    }

    #[test]
    fn round_trips_through_parse() {
        let v = Nested {
            z: 9,
            a: Inner { b: 1, a: 2 },
        };
        let bytes = canonical_bytes(&v).unwrap();
        let parsed: Nested = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, v);
    }

    #[test]
    fn equal_objects_produce_identical_bytes_regardless_of_field_order() {
        let a = serde_json::json!({"y": 1, "x": {"q": 1, "p": 2}});
        let b = serde_json::json!({"x": {"p": 2, "q": 1}, "y": 1});
        assert_eq!(canonical_bytes(&a).unwrap(), canonical_bytes(&b).unwrap());
    }
}

//! Manifest Digests
//!
//! A batch manifest records the SHA-256 of each document it wrote, then a
//! digest of itself taken over a key-sorted JSON form. Field order in the
//! struct therefore never changes `manifest_hash`.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sorted(serde_json::to_value(value)?))
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(fields.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    Ok(sha256_hex(canonical_json(manifest)?.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_keys_sorted() {
        let obj = json!({"z": 1, "a": {"y": [{"k": 0, "b": 1}], "c": 2}});
        assert_eq!(
            canonical_json(&obj).unwrap(),
            r#"{"a":{"c":2,"y":[{"b":1,"k":0}]},"z":1}"#
        );
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_manifest_hash_ignores_field_order() {
        let a = json!({"entries": [1, 2], "canvas_size": 256});
        let b = json!({"canvas_size": 256, "entries": [1, 2]});
        assert_eq!(compute_manifest_hash(&a).unwrap(), compute_manifest_hash(&b).unwrap());
    }
}

//! Canonical serialization and truncated content hashing.
//!
//! Integrity hashes must be reproducible across processes and backends, so
//! hashing never relies on serializer map-ordering defaults: object keys are
//! sorted recursively before the bytes reach the digest.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::types::RowData;

/// Number of hex chars kept from a content digest
pub const CONTENT_HASH_LEN: usize = 16;

/// Serialize a JSON value with all object keys in sorted order, recursively.
pub fn canonical_json(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sort_value(value))
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, val) in entries {
                sorted.insert(key.clone(), sort_value(val));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Truncated SHA-256 over the canonical serialization of a row payload.
///
/// Returns the empty string for an absent or empty payload, matching the
/// stored form for records with nothing to hash.
pub fn content_hash(data: Option<&RowData>) -> Result<String, serde_json::Error> {
    let data = match data {
        Some(map) if !map.is_empty() => map,
        _ => return Ok(String::new()),
    };

    let value = serde_json::to_value(data)?;
    hash_canonical(&value)
}

/// Truncated SHA-256 over the canonical serialization of any JSON value.
pub fn hash_canonical(value: &Value) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    Ok(digest[..CONTENT_HASH_LEN].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_change_the_hash() {
        let mut a = RowData::new();
        a.insert("name".to_string(), json!("PC 34:1"));
        a.insert("mass".to_string(), json!(760.585));

        let mut b = RowData::new();
        b.insert("mass".to_string(), json!(760.585));
        b.insert("name".to_string(), json!("PC 34:1"));

        assert_eq!(
            content_hash(Some(&a)).unwrap(),
            content_hash(Some(&b)).unwrap()
        );
    }

    #[test]
    fn nested_objects_are_sorted_too() {
        let v1 = json!({"outer": {"b": 1, "a": 2}});
        let v2 = json!({"outer": {"a": 2, "b": 1}});
        assert_eq!(canonical_json(&v1).unwrap(), canonical_json(&v2).unwrap());
    }

    #[test]
    fn empty_payload_hashes_to_empty_string() {
        assert_eq!(content_hash(None).unwrap(), "");
        assert_eq!(content_hash(Some(&RowData::new())).unwrap(), "");
    }

    #[test]
    fn hash_is_truncated_hex() {
        let mut data = RowData::new();
        data.insert("name".to_string(), json!("A"));
        let hash = content_hash(Some(&data)).unwrap();
        assert_eq!(hash.len(), CONTENT_HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_payloads_hash_differently() {
        let mut a = RowData::new();
        a.insert("name".to_string(), json!("A"));
        let mut b = RowData::new();
        b.insert("name".to_string(), json!("B"));
        assert_ne!(
            content_hash(Some(&a)).unwrap(),
            content_hash(Some(&b)).unwrap()
        );
    }
}

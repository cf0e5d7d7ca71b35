//! Canonical hashing of ledger values.
//!
//! Values are rendered as compact JSON with object keys sorted at every
//! level, so the digest does not depend on field declaration order or on
//! whether `serde_json` was built with `preserve_order`.
use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::Hash;

pub fn sha256_hex(bytes: &[u8]) -> Hash {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 of the canonical JSON form of `value`.
pub fn digest<T: Serialize + ?Sized>(value: &T) -> Hash {
    sha256_hex(&canonical_json(value))
}

pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Vec<u8> {
    // Ledger types are plain structs of strings and numbers; conversion cannot fail.
    let value = serde_json::to_value(value).expect("ledger values serialize to JSON");
    serde_json::to_vec(&sort_keys(value)).expect("JSON values serialize")
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

//! Canonical JSON and YAML encoding helpers.

use std::collections::BTreeMap;
use std::iter::FromIterator;

use ::serde::de::DeserializeOwned;
use ::serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ErrorInfo, VerityError};

fn serde_error(code: &str, err: impl ToString) -> VerityError {
    VerityError::Serde(ErrorInfo::new(code, err.to_string()))
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut ordered = BTreeMap::new();
            for (key, val) in map {
                ordered.insert(key, canonicalize(val));
            }
            Value::Object(Map::from_iter(ordered))
        }
        Value::Array(values) => {
            let canonical_values = values.into_iter().map(canonicalize).collect();
            Value::Array(canonical_values)
        }
        other => other,
    }
}

/// Serializes a value into canonical JSON bytes with deterministic ordering.
pub fn to_canonical_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, VerityError> {
    let value = serde_json::to_value(value).map_err(|err| serde_error("json-encode", err))?;
    let canonical = canonicalize(value);
    let mut bytes = Vec::new();
    serde_json::to_writer(&mut bytes, &canonical).map_err(|err| serde_error("json-write", err))?;
    Ok(bytes)
}

/// Serializes a value into a single canonical JSON line (no trailing newline).
pub fn to_canonical_json_string<T: Serialize>(value: &T) -> Result<String, VerityError> {
    let bytes = to_canonical_json_bytes(value)?;
    String::from_utf8(bytes).map_err(|err| serde_error("json-utf8", err))
}

/// Restores a value from JSON bytes.
pub fn from_json_slice<T: for<'de> Deserialize<'de>>(data: &[u8]) -> Result<T, VerityError> {
    serde_json::from_slice(data).map_err(|err| serde_error("json-read", err))
}

/// Serializes a value as YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, VerityError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml-write", err))
}

/// Restores a value from YAML bytes (claim sets, render specifications).
pub fn from_yaml_slice<T: DeserializeOwned>(data: &[u8]) -> Result<T, VerityError> {
    serde_yaml::from_slice(data).map_err(|err| serde_error("yaml-read", err))
}

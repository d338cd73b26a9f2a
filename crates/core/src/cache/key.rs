//! Deterministic cache key generation.
//!
//! A key is the compact JSON encoding of `{"args": [...], "method": "..."}`
//! with every object's keys sorted, so logically identical calls map to the
//! same string regardless of how the caller built the arguments. Keys are
//! always namespaced by the operation name.

use std::collections::BTreeSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::Error;

/// An upstream operation and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub method: String,
    pub args: Vec<Value>,
}

impl CacheKey {
    /// Key for a zero-argument operation.
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), args: Vec::new() }
    }

    /// Append a positional argument.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the argument cannot be represented as JSON.
    pub fn arg<T: Serialize + ?Sized>(mut self, arg: &T) -> Result<Self, Error> {
        let value = serde_json::to_value(arg)
            .map_err(|e| Error::InvalidInput(format!("cache key argument for {}: {e}", self.method)))?;
        self.args.push(canonicalize(value));
        Ok(self)
    }

    /// Append an argument whose order carries no meaning.
    ///
    /// The items are sorted and de-duplicated, so `["b", "a", "a"]` and
    /// `["a", "b"]` produce the same key.
    pub fn set_arg<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
        self.args.push(Value::Array(set.into_iter().map(Value::String).collect()));
        self
    }

    /// Encode to the canonical key string.
    pub fn encode(&self) -> String {
        let mut object = Map::new();
        object.insert("args".to_string(), Value::Array(self.args.clone()));
        object.insert("method".to_string(), Value::String(self.method.clone()));
        Value::Object(object).to_string()
    }

    /// Decode a key produced by [`CacheKey::encode`].
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the string is not a cache key.
    pub fn decode(key: &str) -> Result<Self, Error> {
        let value: Value =
            serde_json::from_str(key).map_err(|e| Error::InvalidInput(format!("malformed cache key: {e}")))?;

        let method = value
            .get("method")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidInput("cache key has no method".into()))?;
        let args = value
            .get("args")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InvalidInput("cache key has no args".into()))?;

        Ok(Self { method: method.to_string(), args: args.clone() })
    }

    /// Deserialize the positional arguments, typically into a tuple.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the arguments do not match `T`.
    pub fn args_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(Value::Array(self.args.clone()))
            .map_err(|e| Error::InvalidInput(format!("cache key arguments for {}: {e}", self.method)))
    }

    /// Decode `key` and check that it belongs to `method`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the key is malformed or names another operation.
    pub fn decode_for(key: &str, method: &str) -> Result<Self, Error> {
        let decoded = Self::decode(key)?;
        if decoded.method != method {
            return Err(Error::InvalidInput(format!(
                "cache key for {} used with {method}",
                decoded.method
            )));
        }
        Ok(decoded)
    }
}

/// Short, log-safe fingerprint of a key.
///
/// Keys can be long and may carry identifiers we would rather not spill
/// verbatim into logs.
pub fn fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// Rebuild objects with sorted keys, recursively.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, canonicalize(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

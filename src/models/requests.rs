//! Request DTOs for the cache RPC surface
//!
//! Defines the structure of incoming request bodies. The same types are
//! sent by peers during replication fan-out.

use serde::{Deserialize, Serialize};

use crate::cache::{MAX_KEY_LENGTH, MAX_VALUE_SIZE};

/// Request body for Get (POST /get)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequest {
    pub key: String,
}

impl GetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for Put (POST /put)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value to store
/// - `ttl`: Relative TTL in seconds, applied at receipt; `<= 0` never expires
/// - `is_replica`: Set by peers so the mutation is not forwarded again
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub ttl: i64,
    #[serde(default)]
    pub is_replica: bool,
}

impl PutRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_key(&self.key) {
            return Some(error);
        }
        if self.value.len() > MAX_VALUE_SIZE {
            return Some(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            ));
        }
        None
    }
}

/// Request body for Remove (POST /remove)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub key: String,
    #[serde(default)]
    pub is_replica: bool,
}

impl RemoveRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

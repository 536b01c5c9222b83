//! Response DTOs for the cache RPC surface
//!
//! Defines the structure of outgoing response bodies.

use serde::{Deserialize, Serialize};

use crate::cache::CacheStats;
use crate::replication::ReplicationStats;

/// Response body for Get (POST /get)
///
/// `success = false` means a miss; `value` is then empty and must not be
/// read as a hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetResponse {
    pub value: String,
    pub success: bool,
}

impl GetResponse {
    pub fn hit(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            success: true,
        }
    }

    pub fn miss() -> Self {
        Self {
            value: String::new(),
            success: false,
        }
    }
}

impl From<Option<String>> for GetResponse {
    fn from(lookup: Option<String>) -> Self {
        lookup.map_or_else(Self::miss, Self::hit)
    }
}

/// Response body for Put (POST /put)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PutResponse {
    pub success: bool,
}

/// Response body for Remove (POST /remove)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoveResponse {
    pub success: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    pub replication: ReplicationStats,
}

impl StatsResponse {
    /// Creates a new StatsResponse from cache and replication statistics
    pub fn new(cache: CacheStats, replication: ReplicationStats) -> Self {
        Self {
            hit_rate: cache.hit_rate(),
            hits: cache.hits,
            misses: cache.misses,
            evictions: cache.evictions,
            expirations: cache.expirations,
            total_entries: cache.total_entries,
            replication,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "healthy", or "draining" once the node stops accepting writes
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub peers: usize,
}

impl HealthResponse {
    pub fn new(accepting_writes: bool, peers: usize) -> Self {
        let status = if accepting_writes { "healthy" } else { "draining" };
        Self {
            status: status.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            peers,
        }
    }
}

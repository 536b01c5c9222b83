//! Configuration Module
//!
//! Handles loading and managing node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Node configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the RPC surface listens on
    pub server_port: u16,
    /// Static list of peer addresses (`host:port`) receiving fan-out
    pub peers: Vec<String>,
    /// Maximum number of entries the store can hold
    pub max_entries: usize,
    /// Number of independently locked store shards
    pub shard_count: usize,
    /// Expiry reaper interval in seconds
    pub cleanup_interval: u64,
    /// Per-call timeout for replication requests in milliseconds
    pub replication_timeout_ms: u64,
    /// Pending replication messages buffered per peer
    pub replication_queue_capacity: usize,
    /// Size of the runtime worker pool serving requests
    pub worker_threads: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Listening port (default: 50051)
    /// - `PEERS` - Comma-separated peer addresses (default: none)
    /// - `MAX_ENTRIES` - Maximum store entries (default: 10000)
    /// - `SHARD_COUNT` - Store shards (default: 16)
    /// - `CLEANUP_INTERVAL` - Reaper frequency in seconds (default: 1)
    /// - `REPLICATION_TIMEOUT_MS` - Peer call timeout (default: 500)
    /// - `REPLICATION_QUEUE_CAPACITY` - Per-peer queue bound (default: 1024)
    /// - `WORKER_THREADS` - Runtime worker threads (default: 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            peers: env::var("PEERS")
                .map(|v| parse_peers(&v))
                .unwrap_or(defaults.peers),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            shard_count: env_or("SHARD_COUNT", defaults.shard_count),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            replication_timeout_ms: env_or(
                "REPLICATION_TIMEOUT_MS",
                defaults.replication_timeout_ms,
            ),
            replication_queue_capacity: env_or(
                "REPLICATION_QUEUE_CAPACITY",
                defaults.replication_queue_capacity,
            ),
            worker_threads: env_or("WORKER_THREADS", defaults.worker_threads),
        }
    }

    /// Replication call timeout as a Duration.
    pub fn replication_timeout(&self) -> Duration {
        Duration::from_millis(self.replication_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 50051,
            peers: Vec::new(),
            max_entries: 10_000,
            shard_count: 16,
            cleanup_interval: 1,
            replication_timeout_ms: 500,
            replication_queue_capacity: 1024,
            worker_threads: 4,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma-separated peer list, dropping blank items.
pub fn parse_peers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

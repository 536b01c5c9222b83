//! Replication Module
//!
//! Peer-to-peer propagation of Put/Remove mutations across a fixed set of
//! nodes. Every node forwards what its own clients write and applies, but
//! never re-forwards, what its peers send.

mod fanout;
mod message;
mod peer;

pub use fanout::{ReplicationStats, Replicator};
pub use message::{Mutation, ReplicationMessage};
pub use peer::{HttpPeerClient, PeerClient};

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{CacheError, Result};

/// Builds a replicator with one HTTP client per configured peer.
///
/// All peers share a single connection pool.
pub fn replicator_from_config(config: &Config) -> Result<Replicator> {
    let client = reqwest::Client::builder()
        .timeout(config.replication_timeout())
        .connect_timeout(config.replication_timeout())
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(|e| CacheError::Internal(format!("failed to build peer client: {}", e)))?;

    let peers = config
        .peers
        .iter()
        .map(|address| {
            Arc::new(HttpPeerClient::new(address.clone(), client.clone())) as Arc<dyn PeerClient>
        })
        .collect();

    Ok(Replicator::new(
        peers,
        config.replication_queue_capacity,
        config.replication_timeout(),
    ))
}

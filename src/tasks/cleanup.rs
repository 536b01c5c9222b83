//! Expiry Reaper
//!
//! Background task that periodically removes expired entries that are never
//! read again. Lookups already hide expired entries on their own; this task
//! only bounds memory.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically reaps expired entries.
///
/// Each pass walks the store one shard at a time, yielding to the runtime
/// between shards, so foreground requests only ever wait on the one shard
/// being scanned.
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it during shutdown.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new(10_000, 16));
/// let reaper = spawn_cleanup_task(store.clone(), Duration::from_secs(1));
/// // Later, during shutdown:
/// reaper.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<CacheStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting expiry reaper with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = reap_once(&cache).await;

            if removed > 0 {
                info!("Expiry reaper: removed {} expired entries", removed);
            } else {
                debug!("Expiry reaper: no expired entries found");
            }
        }
    })
}

/// Runs a single incremental pass over every shard.
pub async fn reap_once(cache: &CacheStore) -> usize {
    let mut removed = 0;
    for index in 0..cache.shard_count() {
        removed += cache.cleanup_shard(index);
        tokio::task::yield_now().await;
    }
    removed
}

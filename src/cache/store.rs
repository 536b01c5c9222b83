//! Cache Store Module
//!
//! Sharded entry store combining HashMap storage with LRU tracking and TTL
//! expiration. Each shard has its own lock, so operations on keys that hash
//! to different shards never block each other.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::cache::{CacheEntry, CacheStats, LruTracker, StatsRecorder};
use crate::error::{CacheError, Result};

// == Shard ==
/// One independently locked slice of the key space.
#[derive(Debug, Default)]
struct Shard {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
}

impl Shard {
    /// Removal primitive shared by explicit removes, lazy eviction and the
    /// reaper. Returns whether the key was present.
    fn purge(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    /// Drops every entry whose deadline has passed at `now`.
    fn purge_expired(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.purge(key);
        }
        expired.len()
    }

    /// Drops the least recently used entry, if any.
    fn evict_oldest(&mut self) -> bool {
        match self.lru.evict_oldest() {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }
}

// == Cache Store ==
/// Entry store owning all cache entries and their synchronization.
///
/// Capacity is enforced on the store-wide entry count. When it is reached,
/// the least recently used entry of the inserting shard makes room, so
/// recency is tracked per shard rather than globally.
#[derive(Debug)]
pub struct CacheStore {
    shards: Vec<Mutex<Shard>>,
    max_entries: usize,
    /// Live entry count across all shards
    len: AtomicUsize,
    hasher: RandomState,
    stats: StatsRecorder,
    accepting_writes: AtomicBool,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new store.
    ///
    /// # Arguments
    /// * `max_entries` - Total capacity across all shards
    /// * `shard_count` - Number of independently locked shards
    pub fn new(max_entries: usize, shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);

        Self {
            shards: (0..shard_count).map(|_| Mutex::new(Shard::default())).collect(),
            max_entries: max_entries.max(1),
            len: AtomicUsize::new(0),
            hasher: RandomState::new(),
            stats: StatsRecorder::new(),
            accepting_writes: AtomicBool::new(true),
        }
    }

    fn shard_index(&self, key: &str) -> usize {
        (self.hasher.hash_one(key) % self.shards.len() as u64) as usize
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.accepting_writes.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::Unavailable(
                "store is shutting down and not accepting writes".to_string(),
            ))
        }
    }

    fn forget(&self, count: usize) {
        if count > 0 {
            self.len.fetch_sub(count, Ordering::AcqRel);
        }
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry found here is removed under the same shard lock, so
    /// the check and the removal cannot interleave with another writer.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut shard = self.shards[self.shard_index(key)].lock();

        let expired = match shard.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired(),
        };

        if expired {
            if shard.purge(key) {
                self.forget(1);
            }
            self.stats.record_expirations(1);
            self.stats.record_miss();
            return None;
        }

        shard.lru.touch(key);
        self.stats.record_hit();
        shard.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Put ==
    /// Inserts or replaces `key`, computing its deadline from `ttl_seconds`.
    ///
    /// `ttl_seconds <= 0` stores an entry that never expires. A new key that
    /// takes the store past `max_entries` evicts one least recently used
    /// entry, from its own shard when possible. Overwrites never evict.
    pub fn put(&self, key: String, value: String, ttl_seconds: i64) -> Result<()> {
        self.ensure_writable()?;

        let entry = CacheEntry::new(value, ttl_seconds);
        let index = self.shard_index(&key);
        let mut shard = self.shards[index].lock();

        let mut evict_elsewhere = false;
        if !shard.entries.contains_key(&key) {
            let previous = self.len.fetch_add(1, Ordering::AcqRel);
            if previous >= self.max_entries {
                if shard.evict_oldest() {
                    self.forget(1);
                    self.stats.record_eviction();
                } else {
                    evict_elsewhere = true;
                }
            }
        }

        shard.lru.touch(&key);
        shard.entries.insert(key, entry);
        drop(shard);

        if evict_elsewhere {
            self.evict_from_other_shards(index);
        }
        Ok(())
    }

    /// Evicts one entry from the first other shard that has one.
    ///
    /// Called without holding any shard lock, so shards are only ever locked
    /// one at a time.
    fn evict_from_other_shards(&self, skip: usize) {
        let count = self.shards.len();
        for offset in 1..count {
            let index = (skip + offset) % count;
            if self.shards[index].lock().evict_oldest() {
                self.forget(1);
                self.stats.record_eviction();
                return;
            }
        }
    }

    // == Remove ==
    /// Deletes `key` if present. Returns whether it existed.
    ///
    /// Absence is not an error.
    pub fn remove(&self, key: &str) -> Result<bool> {
        self.ensure_writable()?;
        let removed = self.shards[self.shard_index(key)].lock().purge(key);
        if removed {
            self.forget(1);
        }
        Ok(removed)
    }

    // == Cleanup Expired ==
    /// Removes expired entries from a single shard.
    ///
    /// Only that shard's lock is held, and only for the duration of its scan.
    pub fn cleanup_shard(&self, index: usize) -> usize {
        let Some(shard) = self.shards.get(index) else {
            return 0;
        };
        let removed = shard.lock().purge_expired(Instant::now());
        self.forget(removed);
        self.stats.record_expirations(removed as u64);
        removed
    }

    /// Removes expired entries from every shard, one shard at a time.
    pub fn cleanup_expired(&self) -> usize {
        (0..self.shards.len())
            .map(|index| self.cleanup_shard(index))
            .sum()
    }

    // == Lifecycle ==
    /// Stops accepting mutations. Reads keep working.
    pub fn close(&self) {
        self.accepting_writes.store(false, Ordering::Release);
    }

    pub fn is_accepting_writes(&self) -> bool {
        self.accepting_writes.load(Ordering::Acquire)
    }

    // == Introspection ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    /// Current number of stored entries, including expired ones not yet reaped.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}

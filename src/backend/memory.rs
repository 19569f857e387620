//! In-Process Backend
//!
//! HashMap storage with per-entry expiry implementing [`StorageBackend`].
//! All operations run under one write guard, which makes the conditional
//! primitives atomic.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::backend::{BackendStats, StorageBackend, StoredValue};
use crate::error::Result;

// == Memory Store ==
#[derive(Debug, Default)]
struct MemoryStore {
    /// Key-value storage
    entries: HashMap<String, StoredValue>,
    /// Call statistics
    stats: BackendStats,
}

impl MemoryStore {
    /// Returns the live value for `key`, dropping it first if it expired.
    fn live(&mut self, key: &str) -> Option<&StoredValue> {
        if self.entries.get(key).is_some_and(StoredValue::is_expired) {
            self.entries.remove(key);
        }
        self.entries.get(key)
    }

    fn lookup(&mut self, key: &str) -> Option<Vec<u8>> {
        let found = self.live(key).map(|v| v.bytes.clone());
        self.stats.record_lookup(found.is_some());
        found
    }

    fn remove_live(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(value) => !value.is_expired(),
            None => false,
        }
    }
}

// == Memory Backend ==
/// Backend held entirely in process memory.
///
/// Used as the default connector target and in tests; it behaves like a
/// single-node key-value server, including organic expiry.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: RwLock<MemoryStore>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    // == Stats ==
    /// Returns a snapshot of the call statistics.
    pub async fn stats(&self) -> BackendStats {
        let store = self.store.read().await;
        let now = Instant::now();
        let live = store
            .entries
            .values()
            .filter(|value| !value.is_expired_at(now))
            .count();
        let mut stats = store.stats.clone();
        stats.set_total_entries(live);
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut store = self.store.write().await;
        let now = Instant::now();
        let before = store.entries.len();
        store.entries.retain(|_, value| !value.is_expired_at(now));
        before - store.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remaining lifetime of a live key; `Some(None)` means no expiry.
    pub async fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let mut store = self.store.write().await;
        store.live(key).map(StoredValue::ttl_remaining)
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn string_get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        store.stats.gets += 1;
        Ok(store.lookup(key))
    }

    async fn string_set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<bool> {
        let mut store = self.store.write().await;
        store.stats.sets += 1;
        store
            .entries
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(true)
    }

    async fn string_get_multi(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        let mut store = self.store.write().await;
        store.stats.multi_gets += 1;
        Ok(keys.iter().map(|key| store.lookup(key)).collect())
    }

    async fn string_set_multi(&self, pairs: Vec<(String, Vec<u8>)>) -> Result<bool> {
        let mut store = self.store.write().await;
        store.stats.multi_sets += 1;
        trace!(count = pairs.len(), "multi-set");
        for (key, value) in pairs {
            store.entries.insert(key, StoredValue::new(value, None));
        }
        Ok(true)
    }

    async fn key_delete(&self, key: &str) -> Result<bool> {
        let mut store = self.store.write().await;
        store.stats.deletes += 1;
        Ok(store.remove_live(key))
    }

    async fn key_delete_multi(&self, keys: &[String]) -> Result<u64> {
        let mut store = self.store.write().await;
        store.stats.multi_deletes += 1;
        let removed = keys.iter().filter(|key| store.remove_live(key)).count();
        Ok(removed as u64)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Result<bool> {
        let mut store = self.store.write().await;
        store.stats.conditional_sets += 1;
        if store.live(key).is_some() {
            return Ok(false);
        }
        store
            .entries
            .insert(key.to_string(), StoredValue::new(value, ttl));
        Ok(true)
    }

    async fn compare_and_delete(&self, key: &str, expected: &[u8]) -> Result<bool> {
        let mut store = self.store.write().await;
        store.stats.conditional_deletes += 1;
        let owned = store.live(key).is_some_and(|value| value.bytes == expected);
        if owned {
            store.entries.remove(key);
        }
        Ok(owned)
    }
}

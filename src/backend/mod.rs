//! Storage Backend Module
//!
//! The minimal key-value surface the cache client consumes, plus an
//! in-process implementation with expiry and atomic conditional primitives.

mod entry;
mod memory;
mod stats;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use entry::StoredValue;
pub use memory::MemoryBackend;
pub use stats::BackendStats;

/// Remote key-value store reached over the network.
///
/// Every method is a single round trip. Implementations must make
/// `set_if_absent` and `compare_and_delete` atomic with respect to each
/// other and to plain writes; lock correctness depends on it.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Reads one value.
    async fn string_get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Writes one value, replacing any previous value and expiry.
    /// `ttl` of `None` stores the value without expiry.
    async fn string_set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<bool>;

    /// Reads many values; the result is positionally aligned with `keys`.
    async fn string_get_multi(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Writes many values without expiry in one round trip.
    async fn string_set_multi(&self, pairs: Vec<(String, Vec<u8>)>) -> Result<bool>;

    /// Removes one key. Returns whether a key was removed.
    async fn key_delete(&self, key: &str) -> Result<bool>;

    /// Removes many keys. Returns how many existed.
    async fn key_delete_multi(&self, keys: &[String]) -> Result<u64>;

    /// Stores `value` only if `key` is currently absent.
    async fn set_if_absent(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>)
        -> Result<bool>;

    /// Removes `key` only if its stored value equals `expected`.
    async fn compare_and_delete(&self, key: &str, expected: &[u8]) -> Result<bool>;
}

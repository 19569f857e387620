//! Cache Client Module
//!
//! Typed cache-aside access over a [`StorageBackend`]: single-key reads and
//! writes here, chunked batch operations in `batch`.

mod batch;


use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::backend::StorageBackend;
use crate::codec::{Codec, JsonCodec};
use crate::config::ProviderSettings;
use crate::connection::ConnectionProvider;
use crate::error::{CacheError, Result};
use crate::lock::LockManager;

// == Public Constants ==
/// Chunk size used by batch operations unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Maps the public "zero means forever" TTL onto the backend's optional expiry.
pub(crate) fn expiry(ttl: Duration) -> Option<Duration> {
    if ttl.is_zero() {
        None
    } else {
        Some(ttl)
    }
}

// == Cache Client ==
/// Named client for one backend.
///
/// Cheap to share behind an `Arc`; the only state is the backend handle,
/// which is read-only after construction.
pub struct CacheClient<C: Codec = JsonCodec> {
    name: String,
    backend: Arc<dyn StorageBackend>,
    codec: C,
    chunk_size: usize,
}

impl CacheClient<JsonCodec> {
    /// Creates a client with the default JSON codec.
    pub fn new(name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_codec(name, backend, JsonCodec)
    }

    /// Creates a client from a connection provider, resolving its backend.
    pub async fn connect(name: impl Into<String>, provider: &ConnectionProvider) -> Result<Self> {
        let backend = provider.backend().await?;
        Ok(Self::new(name, backend).with_settings(provider.settings()))
    }
}

impl<C: Codec> CacheClient<C> {
    pub fn with_codec(name: impl Into<String>, backend: Arc<dyn StorageBackend>, codec: C) -> Self {
        Self {
            name: name.into(),
            backend,
            codec,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Applies tuning values from settings.
    pub fn with_settings(mut self, settings: &ProviderSettings) -> Self {
        self.chunk_size = settings.chunk_size.max(1);
        self
    }

    /// Provider name used for registry lookups.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn backend(&self) -> Arc<dyn StorageBackend> {
        Arc::clone(&self.backend)
    }

    /// Lock manager sharing this client's backend.
    pub fn lock_manager(&self) -> LockManager {
        LockManager::new(self.backend())
    }

    // == Get ==
    /// Reads and decodes one value.
    ///
    /// An absent key yields `None`. Bytes that fail to decode are an error,
    /// not a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        if key.is_empty() {
            return Err(CacheError::empty_key("get"));
        }
        debug!(provider = %self.name, key, "get");
        match self.backend.string_get(key).await? {
            Some(bytes) => self.codec.decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    // == Get Or Populate ==
    /// Cache-aside read.
    ///
    /// When the key is absent, undecodable, or `force` is set, `producer` runs.
    /// A `Some` result is written back with `ttl` and returned; `None` falls
    /// through to whatever was read. An empty key returns `None` without
    /// touching the backend.
    ///
    /// Pass `|| async { None }` when there is no producer: the call is then a
    /// plain read that never writes, and `force` has no effect.
    ///
    /// Concurrent misses on the same key each run their producer; there is
    /// no in-process de-duplication.
    pub async fn get_or_populate<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        force: bool,
        producer: F,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        if key.is_empty() {
            return Ok(None);
        }

        let cached: Option<Result<T>> = self
            .backend
            .string_get(key)
            .await?
            .map(|bytes| self.codec.decode(key, &bytes));

        if force || !matches!(cached, Some(Ok(_))) {
            debug!(provider = %self.name, key, force, "populating");
            if let Some(value) = producer().await {
                self.set(key, &value, ttl).await?;
                return Ok(Some(value));
            }
        }

        cached.transpose()
    }

    // == Set ==
    /// Encodes and writes one value. A zero `ttl` means no expiry.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<bool> {
        if key.is_empty() {
            return Err(CacheError::empty_key("set"));
        }
        let bytes = self.codec.encode(value)?;
        debug!(provider = %self.name, key, bytes = bytes.len(), ?ttl, "set");
        self.backend.string_set(key, bytes, expiry(ttl)).await
    }

    // == Delete ==
    /// Removes one key. Deleting an absent key returns `false`.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        if key.is_empty() {
            return Err(CacheError::empty_key("delete"));
        }
        debug!(provider = %self.name, key, "delete");
        self.backend.key_delete(key).await
    }
}

//! Distributed Lock Module
//!
//! Token-based mutual exclusion on top of the backend's conditional
//! primitives. A lock is a key whose stored value is the owner's token;
//! only a release presenting the same token removes it, and the expiry
//! frees it if the owner disappears.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, warn};

use crate::backend::StorageBackend;
use crate::client::expiry;
use crate::error::{CacheError, Result};

// == Lock Token ==
/// Opaque proof of lock ownership, stored verbatim as the lock's value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockToken(Vec<u8>);

impl LockToken {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for LockToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for LockToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Vec<u8>> for LockToken {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

// == Lock Record ==
/// A lock as requested from the backend: which key, who owns it, for how long.
///
/// The backend only stores the owner bytes under the key; keeping the key and
/// the owner apart here makes the compare-and-delete on release explicit.
#[derive(Debug, Clone)]
pub struct LockRecord<'a> {
    pub key: &'a str,
    pub owner: &'a LockToken,
    pub ttl: Duration,
}

impl<'a> LockRecord<'a> {
    fn validated(op: &str, key: &'a str, owner: &'a LockToken, ttl: Duration) -> Result<Self> {
        if key.is_empty() {
            return Err(CacheError::empty_key(op));
        }
        if owner.is_empty() {
            return Err(CacheError::InvalidArgument(format!(
                "{op}: lock token cannot be empty"
            )));
        }
        Ok(Self { key, owner, ttl })
    }
}

// == Lock Manager ==
/// Acquires and releases named locks on a shared backend.
#[derive(Clone)]
pub struct LockManager {
    backend: Arc<dyn StorageBackend>,
}

impl LockManager {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    // == Acquire ==
    /// Single attempt. Returns `false` when another token holds the key.
    ///
    /// A zero `ttl` takes the lock without expiry.
    pub async fn acquire(&self, key: &str, token: &LockToken, ttl: Duration) -> Result<bool> {
        let record = LockRecord::validated("acquire", key, token, ttl)?;
        let acquired = self
            .backend
            .set_if_absent(record.key, record.owner.as_bytes().to_vec(), expiry(record.ttl))
            .await?;
        debug!(key, acquired, "lock acquire");
        Ok(acquired)
    }

    // == Release ==
    /// Removes the lock only if it is held by `token`.
    ///
    /// Returns `false` when the key is absent or held by someone else.
    pub async fn release(&self, key: &str, token: &LockToken) -> Result<bool> {
        let record = LockRecord::validated("release", key, token, Duration::ZERO)?;
        let released = self
            .backend
            .compare_and_delete(record.key, record.owner.as_bytes())
            .await?;
        debug!(key, released, "lock release");
        Ok(released)
    }

    // == Acquire With Retry ==
    /// Polls `acquire` every `poll_interval` until it succeeds or `timeout`
    /// elapses, in which case it fails with [`CacheError::LockTimeout`].
    ///
    /// `Duration::MAX` waits without bound.
    pub async fn acquire_with_retry(
        &self,
        key: &str,
        token: &LockToken,
        ttl: Duration,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<()> {
        // A timeout past the clock's range never fires
        let acquired = match Instant::now().checked_add(timeout) {
            Some(deadline) => {
                self.poll(key, token, ttl, poll_interval, sleep_until(deadline))
                    .await?
            }
            None => {
                self.poll(key, token, ttl, poll_interval, std::future::pending())
                    .await?
            }
        };
        if acquired {
            return Ok(());
        }
        warn!(key, ?timeout, "gave up waiting for lock");
        Err(CacheError::LockTimeout(key.to_string()))
    }

    /// Polls `acquire` every `poll_interval` until it succeeds or `cancel`
    /// completes, in which case it fails with [`CacheError::Cancelled`].
    pub async fn acquire_with_retry_until<F>(
        &self,
        key: &str,
        token: &LockToken,
        ttl: Duration,
        poll_interval: Duration,
        cancel: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        if self.poll(key, token, ttl, poll_interval, cancel).await? {
            return Ok(());
        }
        debug!(key, "lock wait cancelled");
        Err(CacheError::Cancelled(key.to_string()))
    }

    /// Returns `true` once acquired, `false` if `stop` fired first.
    ///
    /// `stop` is only observed between attempts: an attempt in flight always
    /// completes, so a lock taken by the backend is never lost to a drop.
    async fn poll<F>(
        &self,
        key: &str,
        token: &LockToken,
        ttl: Duration,
        poll_interval: Duration,
        stop: F,
    ) -> Result<bool>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(stop);
        let mut attempts: u64 = 0;
        loop {
            attempts += 1;
            if self.acquire(key, token, ttl).await? {
                debug!(key, attempts, "lock acquired after polling");
                return Ok(true);
            }
            tokio::select! {
                biased;
                _ = &mut stop => return Ok(false),
                _ = sleep(poll_interval) => {}
            }
        }
    }
}

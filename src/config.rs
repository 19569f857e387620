//! Configuration Module
//!
//! Loads provider settings from environment variables and validates them.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Highest logical database index the backend exposes.
pub const MAX_DB_NUMBER: u8 = 15;

/// Connection and tuning parameters for one cache provider.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Backend address
    pub connection_string: String,
    /// Logical database index, 0..=15
    pub db_number: i64,
    /// Default chunk size for batch operations
    pub chunk_size: usize,
    /// Delay between lock acquisition attempts in milliseconds
    pub lock_poll_interval_ms: u64,
    /// Default lock expiry in seconds
    pub lock_ttl_secs: u64,
    /// Expiry sweep interval for the in-process backend, in seconds
    pub sweep_interval_secs: u64,
}

impl ProviderSettings {
    /// Creates settings by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CONNECTION_STRING` - Backend address (default: 127.0.0.1:6379)
    /// - `CACHE_DB_NUMBER` - Database index (default: 0)
    /// - `CACHE_CHUNK_SIZE` - Batch chunk size (default: 100)
    /// - `CACHE_LOCK_POLL_MS` - Lock poll interval in ms (default: 100)
    /// - `CACHE_LOCK_TTL_SECS` - Lock expiry in seconds (default: 3600)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Expiry sweep interval (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            connection_string: env::var("CACHE_CONNECTION_STRING")
                .unwrap_or(defaults.connection_string),
            db_number: parse_env("CACHE_DB_NUMBER").unwrap_or(defaults.db_number),
            chunk_size: parse_env("CACHE_CHUNK_SIZE").unwrap_or(defaults.chunk_size),
            lock_poll_interval_ms: parse_env("CACHE_LOCK_POLL_MS")
                .unwrap_or(defaults.lock_poll_interval_ms),
            lock_ttl_secs: parse_env("CACHE_LOCK_TTL_SECS").unwrap_or(defaults.lock_ttl_secs),
            sweep_interval_secs: parse_env("CACHE_SWEEP_INTERVAL_SECS")
                .unwrap_or(defaults.sweep_interval_secs),
        }
    }

    /// Checks the settings invariants.
    ///
    /// Rejects an empty connection string, a database index outside 0..=15,
    /// a zero chunk size and zero lock poll or sweep intervals.
    pub fn validate(&self) -> Result<()> {
        if self.connection_string.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "connection string was not found".to_string(),
            ));
        }
        if !(0..=i64::from(MAX_DB_NUMBER)).contains(&self.db_number) {
            return Err(CacheError::InvalidConfig(format!(
                "db number {} is outside 0..={}",
                self.db_number, MAX_DB_NUMBER
            )));
        }
        if self.chunk_size == 0 {
            return Err(CacheError::InvalidConfig(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "lock poll interval must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            connection_string: "127.0.0.1:6379".to_string(),
            db_number: 0,
            chunk_size: 100,
            lock_poll_interval_ms: 100,
            lock_ttl_secs: 3600,
            sweep_interval_secs: 1,
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

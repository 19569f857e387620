//! Error types for the cache client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache client.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Empty key, token or other argument rejected before any backend call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Provider settings failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No provider registered under the requested name
    #[error("Provider not found: {0}")]
    NotFound(String),

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend answered with a failure
    #[error("Backend error: {0}")]
    Backend(String),

    /// Value could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),

    /// Stored bytes could not be decoded into the requested type
    #[error("Decode error for key {key}: {message}")]
    Decode { key: String, message: String },

    /// Lock was not acquired before the deadline
    #[error("Timed out waiting for lock: {0}")]
    LockTimeout(String),

    /// Lock wait aborted by the caller
    #[error("Lock wait cancelled: {0}")]
    Cancelled(String),
}

impl CacheError {
    /// Shorthand for an empty-key rejection.
    pub(crate) fn empty_key(op: &str) -> Self {
        CacheError::InvalidArgument(format!("{op}: key cannot be empty"))
    }

    /// True for failures raised by the storage backend itself.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            CacheError::BackendUnavailable(_) | CacheError::Backend(_)
        )
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache client.
pub type Result<T> = std::result::Result<T, CacheError>;

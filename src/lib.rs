//! Cache Client - a distributed caching client over a remote key-value store
//!
//! Provides cache-aside reads, token-based distributed locks and chunked
//! batch operations on top of a minimal storage backend interface.

pub mod backend;
pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod lock;
pub mod registry;
pub mod tasks;

pub use backend::{MemoryBackend, StorageBackend};
pub use client::{CacheClient, DEFAULT_CHUNK_SIZE};
pub use codec::{Codec, JsonCodec};
pub use config::ProviderSettings;
pub use connection::{ConnectionProvider, Connector, MemoryConnector};
pub use error::{CacheError, Result};
pub use lock::{LockManager, LockToken};
pub use registry::ProviderRegistry;
pub use tasks::spawn_expiry_sweeper;

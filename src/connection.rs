//! Connection Provider
//!
//! Resolves the backend handle for one provider and caches it, so every
//! client built from the same provider shares a single live connection.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::info;

use crate::backend::{MemoryBackend, StorageBackend};
use crate::config::ProviderSettings;
use crate::error::Result;

/// Establishes a backend connection from validated settings.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: &ProviderSettings) -> Result<Arc<dyn StorageBackend>>;
}

// == Memory Connector ==
/// Connector that always hands out the same in-process backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    backend: Arc<MemoryBackend>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: Arc<MemoryBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Arc<MemoryBackend> {
        Arc::clone(&self.backend)
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, _settings: &ProviderSettings) -> Result<Arc<dyn StorageBackend>> {
        let backend: Arc<dyn StorageBackend> = self.backend.clone();
        Ok(backend)
    }
}

// == Connection Provider ==
/// Lazily connects once and reuses the handle afterwards.
///
/// The handle is read-only after the first successful resolution. A failed
/// connect is not cached; the next call tries again.
pub struct ConnectionProvider {
    settings: ProviderSettings,
    connector: Arc<dyn Connector>,
    handle: OnceCell<Arc<dyn StorageBackend>>,
}

impl ConnectionProvider {
    /// Creates a provider, rejecting invalid settings up front.
    pub fn new(settings: ProviderSettings, connector: Arc<dyn Connector>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            connector,
            handle: OnceCell::new(),
        })
    }

    /// Returns the cached backend handle, connecting on first use.
    pub async fn backend(&self) -> Result<Arc<dyn StorageBackend>> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                info!(
                    connection = %self.settings.connection_string,
                    db = self.settings.db_number,
                    "Connecting to cache backend"
                );
                self.connector.connect(&self.settings).await
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

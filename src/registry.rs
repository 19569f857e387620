//! Provider Registry
//!
//! Maps logical provider names to configured clients for deployments that
//! talk to more than one backend. Populated once at composition time, then
//! shared read-only.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::client::CacheClient;
use crate::codec::{Codec, JsonCodec};
use crate::error::{CacheError, Result};

pub struct ProviderRegistry<C: Codec = JsonCodec> {
    providers: HashMap<String, Arc<CacheClient<C>>>,
}

impl<C: Codec> Default for ProviderRegistry<C> {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }
}

impl<C: Codec> ProviderRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry keyed by each client's own name.
    pub fn from_clients(clients: impl IntoIterator<Item = CacheClient<C>>) -> Result<Self> {
        let mut registry = Self::new();
        for client in clients {
            let name = client.name().to_string();
            registry.register(name, client)?;
        }
        Ok(registry)
    }

    /// Registers `client` under `name`. Names must be non-empty and unique.
    pub fn register(&mut self, name: impl Into<String>, client: CacheClient<C>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CacheError::InvalidArgument(
                "provider name cannot be empty".to_string(),
            ));
        }
        if self.providers.contains_key(&name) {
            return Err(CacheError::InvalidArgument(format!(
                "provider {name} is already registered"
            )));
        }
        info!(provider = %name, "Registered cache provider");
        self.providers.insert(name, Arc::new(client));
        Ok(())
    }

    /// Looks up a provider. Unknown names are an error, never an empty result.
    pub fn resolve(&self, name: &str) -> Result<Arc<CacheClient<C>>> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::NotFound(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

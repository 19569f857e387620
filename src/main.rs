//! Cache Client demo
//!
//! Wires a provider against the in-process backend and walks through a
//! cache-aside read, a chunked batch round trip and a lock handoff.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cache_client::{
    spawn_expiry_sweeper, CacheClient, ConnectionProvider, LockToken, MemoryConnector,
    ProviderRegistry, ProviderSettings,
};

const PROVIDER: &str = "default";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cache_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = ProviderSettings::from_env();
    info!(
        "Configuration loaded: connection={}, db={}, chunk_size={}, lock_poll={}ms",
        settings.connection_string,
        settings.db_number,
        settings.chunk_size,
        settings.lock_poll_interval_ms
    );

    let connector = MemoryConnector::new();
    let backend = connector.backend();
    let provider = ConnectionProvider::new(settings.clone(), Arc::new(connector))
        .context("invalid provider settings")?;
    let sweeper = spawn_expiry_sweeper(backend, settings.sweep_interval());

    let registry = ProviderRegistry::from_clients([CacheClient::connect(PROVIDER, &provider)
        .await
        .context("failed to resolve backend")?])?;
    let client = registry.resolve(PROVIDER)?;

    // Cache-aside: first call populates, second is served from the cache
    for round in 0..2 {
        let greeting: Option<String> = client
            .get_or_populate("demo:greeting", Duration::from_secs(60), false, || async move {
                info!(round, "Producing greeting");
                Some("hello".to_string())
            })
            .await?;
        info!(round, ?greeting, "Cache-aside read");
    }

    // Chunked batch round trip
    let pairs: Vec<(String, u32)> = (0..250).map(|i| (format!("demo:item:{i}"), i)).collect();
    let keys: Vec<String> = pairs.iter().map(|(key, _)| key.clone()).collect();
    let written = client.batch_set(&pairs).await?;
    let values: Vec<Option<u32>> = client.batch_get(&keys).await?;
    info!(
        written,
        read = values.iter().flatten().count(),
        "Batch round trip complete"
    );
    client.batch_delete(&keys).await?;

    // Lock handoff between two owners
    let locks = client.lock_manager();
    let first = LockToken::from(format!("demo-{}-a", std::process::id()));
    let second = LockToken::from(format!("demo-{}-b", std::process::id()));
    locks
        .acquire_with_retry(
            "lock:demo",
            &first,
            settings.lock_ttl(),
            settings.lock_poll_interval(),
            Duration::from_secs(5),
        )
        .await?;
    let contended = locks.acquire("lock:demo", &second, settings.lock_ttl()).await?;
    info!(contended, "Second owner tried the held lock");
    locks.release("lock:demo", &first).await?;
    locks
        .acquire_with_retry(
            "lock:demo",
            &second,
            settings.lock_ttl(),
            settings.lock_poll_interval(),
            Duration::from_secs(5),
        )
        .await?;
    locks.release("lock:demo", &second).await?;
    info!("Lock handoff complete");

    sweeper.abort();
    info!("Demo complete");
    Ok(())
}

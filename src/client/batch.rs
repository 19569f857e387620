//! Chunked Batch Operations
//!
//! Batches are split into consecutive chunks of at most `chunk_size` keys,
//! one backend round trip per chunk. Chunks run sequentially unless noted;
//! a failing chunk aborts the rest and earlier chunks stay committed.

use futures::future::try_join_all;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::CacheClient;
use crate::codec::Codec;
use crate::error::{CacheError, Result};

fn validate_chunk_size(op: &str, chunk_size: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(CacheError::InvalidArgument(format!(
            "{op}: chunk size must be greater than zero"
        )));
    }
    Ok(())
}

fn validate_keys<'a>(op: &str, keys: impl IntoIterator<Item = &'a String>) -> Result<()> {
    if keys.into_iter().any(|key| key.is_empty()) {
        return Err(CacheError::empty_key(op));
    }
    Ok(())
}

impl<C: Codec> CacheClient<C> {
    // == Batch Set ==
    /// Writes all pairs using the client's chunk size. Returns the count written.
    pub async fn batch_set<V: Serialize>(&self, pairs: &[(String, V)]) -> Result<usize> {
        self.batch_set_chunked(pairs, self.chunk_size).await
    }

    /// Writes all pairs without expiry, `chunk_size` pairs per round trip.
    ///
    /// Every key is validated before the first round trip. Values are encoded
    /// per chunk, so an encode failure also aborts the remaining chunks.
    pub async fn batch_set_chunked<V: Serialize>(
        &self,
        pairs: &[(String, V)],
        chunk_size: usize,
    ) -> Result<usize> {
        validate_chunk_size("batch_set", chunk_size)?;
        validate_keys("batch_set", pairs.iter().map(|(key, _)| key))?;

        let mut total = 0;
        for (index, chunk) in pairs.chunks(chunk_size).enumerate() {
            let encoded = chunk
                .iter()
                .map(|(key, value)| -> Result<(String, Vec<u8>)> {
                    Ok((key.clone(), self.codec.encode(value)?))
                })
                .collect::<Result<Vec<_>>>()?;

            debug!(provider = %self.name, chunk = index, size = encoded.len(), "batch set chunk");
            if !self.backend.string_set_multi(encoded).await? {
                return Err(CacheError::Backend(format!(
                    "multi-set rejected for chunk {index} after {total} entries written"
                )));
            }
            total += chunk.len();
        }
        Ok(total)
    }

    // == Batch Get ==
    /// Reads all keys using the client's chunk size.
    pub async fn batch_get<T: DeserializeOwned>(&self, keys: &[String]) -> Result<Vec<Option<T>>> {
        self.batch_get_chunked(keys, self.chunk_size).await
    }

    /// Reads all keys, `chunk_size` keys per round trip.
    ///
    /// The result lines up with `keys`. Misses and entries that fail to
    /// decode both come back as `None`.
    pub async fn batch_get_chunked<T: DeserializeOwned>(
        &self,
        keys: &[String],
        chunk_size: usize,
    ) -> Result<Vec<Option<T>>> {
        validate_chunk_size("batch_get", chunk_size)?;
        validate_keys("batch_get", keys)?;

        let mut result = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(chunk_size) {
            result.extend(self.get_chunk::<T>(chunk).await?);
        }
        Ok(result)
    }

    /// Same contract as [`batch_get_chunked`](Self::batch_get_chunked), with
    /// all chunks in flight at once.
    pub async fn batch_get_parallel<T: DeserializeOwned>(
        &self,
        keys: &[String],
        chunk_size: usize,
    ) -> Result<Vec<Option<T>>> {
        validate_chunk_size("batch_get", chunk_size)?;
        validate_keys("batch_get", keys)?;

        let chunks =
            try_join_all(keys.chunks(chunk_size).map(|chunk| self.get_chunk::<T>(chunk))).await?;
        Ok(chunks.into_iter().flatten().collect())
    }

    async fn get_chunk<T: DeserializeOwned>(&self, chunk: &[String]) -> Result<Vec<Option<T>>> {
        debug!(provider = %self.name, size = chunk.len(), "batch get chunk");
        let values = self.backend.string_get_multi(chunk).await?;
        if values.len() != chunk.len() {
            return Err(CacheError::Backend(format!(
                "multi-get returned {} values for {} keys",
                values.len(),
                chunk.len()
            )));
        }

        Ok(chunk
            .iter()
            .zip(values)
            .map(|(key, bytes)| {
                let bytes = bytes?;
                match self.codec.decode::<T>(key, &bytes) {
                    Ok(value) => Some(value),
                    Err(err) => {
                        warn!(
                            provider = %self.name,
                            key = %key,
                            error = %err,
                            "Treating undecodable entry as a miss"
                        );
                        None
                    }
                }
            })
            .collect())
    }

    // == Batch Delete ==
    /// Removes all keys using the client's chunk size.
    pub async fn batch_delete(&self, keys: &[String]) -> Result<()> {
        self.batch_delete_chunked(keys, self.chunk_size).await
    }

    /// Removes all keys, `chunk_size` keys per round trip. Absent keys are ignored.
    pub async fn batch_delete_chunked(&self, keys: &[String], chunk_size: usize) -> Result<()> {
        validate_chunk_size("batch_delete", chunk_size)?;
        validate_keys("batch_delete", keys)?;

        for chunk in keys.chunks(chunk_size) {
            let removed = self.backend.key_delete_multi(chunk).await?;
            debug!(provider = %self.name, size = chunk.len(), removed, "batch delete chunk");
        }
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::backend::{MemoryBackend, StorageBackend};

    fn create_client() -> (CacheClient, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (CacheClient::new("batch", backend.clone()), backend)
    }

    fn keys(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("test{i}")).collect()
    }

    #[tokio::test]
    async fn test_batch_set_250_in_three_chunks() {
        let (client, backend) = create_client();
        let pairs: Vec<(String, usize)> = (0..250).map(|i| (format!("test{i}"), i)).collect();

        let written = client.batch_set_chunked(&pairs, 100).await.unwrap();

        assert_eq!(written, 250);
        assert_eq!(backend.stats().await.multi_sets, 3);
        assert_eq!(backend.len().await, 250);
    }

    #[tokio::test]
    async fn test_batch_set_empty_input() {
        let (client, backend) = create_client();
        let pairs: Vec<(String, i32)> = Vec::new();

        assert_eq!(client.batch_set(&pairs).await.unwrap(), 0);
        assert_eq!(backend.stats().await.round_trips(), 0);
    }

    #[tokio::test]
    async fn test_batch_set_rejects_empty_key_before_any_call() {
        let (client, backend) = create_client();
        let pairs = vec![("a".to_string(), 1), (String::new(), 2)];

        let result = client.batch_set_chunked(&pairs, 1).await;

        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
        assert_eq!(backend.stats().await.round_trips(), 0);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_rejected() {
        let (client, _) = create_client();
        let result: Result<Vec<Option<i32>>> = client.batch_get_chunked(&keys(0..3), 0).await;
        assert!(matches!(result, Err(CacheError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_batch_get_order_and_misses() {
        let (client, backend) = create_client();
        let pairs: Vec<(String, usize)> = (0..10)
            .filter(|i| i % 3 != 0)
            .map(|i| (format!("test{i}"), i))
            .collect();
        client.batch_set_chunked(&pairs, 4).await.unwrap();

        let values: Vec<Option<usize>> = client.batch_get_chunked(&keys(0..10), 4).await.unwrap();

        let expected: Vec<Option<usize>> =
            (0..10).map(|i| if i % 3 == 0 { None } else { Some(i) }).collect();
        assert_eq!(values, expected);
        assert_eq!(backend.stats().await.multi_gets, 3);
    }

    #[tokio::test]
    async fn test_batch_get_undecodable_is_miss() {
        let (client, backend) = create_client();
        client.set("test0", &0u32, Duration::ZERO).await.unwrap();
        backend.string_set("test1", b"garbage".to_vec(), None).await.unwrap();
        client.set("test2", &2u32, Duration::ZERO).await.unwrap();

        let values: Vec<Option<u32>> = client.batch_get(&keys(0..3)).await.unwrap();

        assert_eq!(values, vec![Some(0), None, Some(2)]);
    }

    #[tokio::test]
    async fn test_batch_get_parallel_preserves_order() {
        let (client, _) = create_client();
        let pairs: Vec<(String, usize)> = (0..57).map(|i| (format!("test{i}"), i)).collect();
        client.batch_set(&pairs).await.unwrap();

        let values: Vec<Option<usize>> = client.batch_get_parallel(&keys(0..60), 7).await.unwrap();

        assert_eq!(values.len(), 60);
        for (i, value) in values.into_iter().enumerate() {
            assert_eq!(value, (i < 57).then_some(i));
        }
    }

    #[tokio::test]
    async fn test_batch_delete_chunks_and_ignores_absent() {
        let (client, backend) = create_client();
        let pairs: Vec<(String, usize)> = (0..5).map(|i| (format!("test{i}"), i)).collect();
        client.batch_set(&pairs).await.unwrap();

        client.batch_delete_chunked(&keys(0..8), 3).await.unwrap();

        let stats = backend.stats().await;
        assert_eq!(stats.multi_deletes, 3);
        assert!(backend.is_empty().await);
    }
}

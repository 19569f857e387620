//! Value Codec
//!
//! Turns typed values into the byte representation handed to the backend.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{CacheError, Result};

/// Pluggable serialization format for cached values.
///
/// `decode` receives the key so failures can name the entry that was malformed.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>>;

    fn decode<T: DeserializeOwned>(&self, key: &str, bytes: &[u8]) -> Result<T>;
}

// == JSON Codec ==
/// Default structured text codec backed by serde_json.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| CacheError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, key: &str, bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes).map_err(|e| CacheError::Decode {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

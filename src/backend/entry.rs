//! Stored Value Module
//!
//! One value held by the in-process backend, with its expiry deadline.

use std::time::{Duration, Instant};

// == Stored Value ==
/// Bytes plus an optional expiry instant.
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// The stored bytes
    pub bytes: Vec<u8>,
    /// Expiry instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl StoredValue {
    // == Constructor ==
    /// Creates a value that expires `ttl` from now, or never when `ttl` is None.
    ///
    /// A `ttl` too large to represent as an instant also means never.
    pub fn new(bytes: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            bytes,
            expires_at: ttl.and_then(|ttl| Instant::now().checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the value has expired.
    ///
    /// A value is expired once the current instant is greater than or equal
    /// to its expiry instant.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub(crate) fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, or None if no expiration is set.
    ///
    /// Expired values report `Duration::ZERO`.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_value_no_ttl() {
        let value = StoredValue::new(b"v".to_vec(), None);

        assert_eq!(value.bytes, b"v");
        assert!(value.expires_at.is_none());
        assert!(!value.is_expired());
        assert!(value.ttl_remaining().is_none());
    }

    #[test]
    fn test_value_expiration() {
        let value = StoredValue::new(b"v".to_vec(), Some(Duration::from_millis(30)));

        assert!(!value.is_expired());

        sleep(Duration::from_millis(50));

        assert!(value.is_expired());
        assert_eq!(value.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_ttl_remaining() {
        let value = StoredValue::new(b"v".to_vec(), Some(Duration::from_secs(10)));

        let remaining = value.ttl_remaining().unwrap();
        assert!(remaining <= Duration::from_secs(10));
        assert!(remaining >= Duration::from_secs(9));
    }

    #[test]
    fn test_unrepresentable_ttl_never_expires() {
        let value = StoredValue::new(b"v".to_vec(), Some(Duration::MAX));

        assert!(value.expires_at.is_none());
        assert!(!value.is_expired());
        assert!(value.ttl_remaining().is_none());
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let value = StoredValue {
            bytes: Vec::new(),
            expires_at: Some(now),
        };

        assert!(value.is_expired_at(now), "Value should be expired at boundary");
    }
}

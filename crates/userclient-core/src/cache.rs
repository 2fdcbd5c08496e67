//! Key-value cache capability.
//!
//! Values are opaque bytes; encoding is the caller's concern.

use async_trait::async_trait;

/// Failure reported by a cache store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The store could not be reached.
    #[error("Cache connection error: {0}")]
    Connection(String),

    /// The store rejected or failed the command.
    #[error("Cache command error: {0}")]
    Command(String),
}

/// A shared key-value store addressed by string keys.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

//! Key-value cache port.
//!
//! The application reads through this cache and invalidates it after every
//! mutation. Entries are disposable copies with a TTL; storage stays the
//! source of truth.
//!
//! Implementations report failures as `ErrorCode::CacheError`. Callers in the
//! application layer log those failures and carry on without the cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for the shared key-value cache.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Returns the stored bytes, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Stores `value` under `key` for `ttl`, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError>;

    /// Removes one key. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<(), DomainError>;

    /// Removes every key that starts with `prefix`.
    ///
    /// The prefix is literal: glob characters in it match themselves.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), DomainError>;
}

//! Read-through caching for query handlers.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ports::Cache;

/// Returns the cached value for `key`, or runs `load`, caches its result
/// for `ttl` and returns it.
///
/// Cache errors and undecodable entries count as misses. Errors from `load`
/// are returned unchanged and nothing is cached.
pub async fn read_through<T, E, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(bytes)) => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => {
                tracing::trace!(key = %key, "Cache hit");
                return Ok(value);
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(key = %key, error = %e, "Cache read failed"),
    }

    let value = load().await?;

    match serde_json::to_vec(&value) {
        Ok(bytes) => {
            if let Err(e) = cache.set(key, &bytes, ttl).await {
                tracing::warn!(key = %key, error = %e, "Cache write failed");
            }
        }
        Err(e) => tracing::warn!(key = %key, error = %e, "Failed to encode cache entry"),
    }

    Ok(value)
}

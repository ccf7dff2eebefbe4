//! In-memory cache implementation for testing and development.
//!
//! Entries expire lazily: an expired entry is dropped when it is next read
//! or when a prefix deletion walks over it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::foundation::DomainError;
use crate::ports::Cache;

/// In-memory cache for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a live entry exists for `key`.
    pub async fn contains(&self, key: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .is_some_and(|e| e.expires_at > Instant::now())
    }

    /// Live keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.expires_at > now)
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), DomainError> {
        self.entries
            .write()
            .await
            .retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn get_returns_what_was_set() {
        let cache = InMemoryCache::new();
        cache.set("person_subs:all", b"[]", TTL).await.unwrap();

        assert_eq!(cache.get("person_subs:all").await.unwrap(), Some(b"[]".to_vec()));
        assert_eq!(cache.get("people:all").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("stat:total_clients", b"4", Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(cache.contains("stat:total_clients").await);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("stat:total_clients").await.unwrap(), None);
        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn delete_by_prefix_leaves_other_keys() {
        let cache = InMemoryCache::new();
        for key in [
            "stat:income:2024-01-01:2024-01-31",
            "stat:income:2024-02-01:2024-02-29",
            "stat:income",
            "stat:total_income",
        ] {
            cache.set(key, b"1", TTL).await.unwrap();
        }

        cache.delete_by_prefix("stat:income:").await.unwrap();

        assert_eq!(cache.keys().await, vec!["stat:income", "stat:total_income"]);
    }

    #[tokio::test]
    async fn deleting_missing_key_succeeds() {
        let cache = InMemoryCache::new();
        assert!(cache.delete("nothing").await.is_ok());
    }
}

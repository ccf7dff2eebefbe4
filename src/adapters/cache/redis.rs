//! Redis-backed cache for multi-instance deployments.
//!
//! Values are stored with `SET key value EX ttl`. Prefix deletion walks the
//! keyspace with `SCAN MATCH` and deletes each page of matches, so it never
//! blocks the server the way `KEYS` would.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::DomainError;
use crate::ports::Cache;

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 100;

/// Redis-backed implementation of the `Cache` port.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

fn cache_err(op: &str, key: &str, err: redis::RedisError) -> DomainError {
    DomainError::cache(format!("redis {} {}: {}", op, key, err))
}

/// Escapes glob metacharacters so the prefix matches literally.
fn escape_glob(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('*');
    escaped
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| cache_err("GET", key, e))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let secs = ttl.as_secs().max(1);
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(secs)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| cache_err("SET", key, e))
    }

    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| cache_err("DEL", key, e))
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let pattern = escape_glob(prefix);
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| cache_err("SCAN", &pattern, e))?;

            if !keys.is_empty() {
                conn.del::<_, ()>(&keys)
                    .await
                    .map_err(|e| cache_err("DEL", &pattern, e))?;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        tracing::debug!(prefix = %prefix, "Deleted cache keys by prefix");
        Ok(())
    }
}

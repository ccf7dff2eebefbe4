//! Cache invalidation.
//!
//! Invalidation deliberately over-reaches: a mutation clears whole families
//! of keys by prefix instead of tracking which entries it could have
//! changed. An extra recompute is cheap; a stale statistic is a bug.

use std::sync::Arc;

use crate::ports::Cache;

use super::keys;

/// A named group of cache prefixes and exact keys cleared together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidationSet {
    pub prefixes: &'static [&'static str],
    pub keys: &'static [&'static str],
}

/// Every cached statistic. Cleared after any subscription, freeze, person or
/// single-visit mutation.
pub const STATISTICS_FAMILY: InvalidationSet = InvalidationSet {
    prefixes: &[
        "stat:income:",
        "stat:sold_subs:",
        "stat:new_clients:",
        "stat:monthly_stats:",
        "stat:single_visits:",
    ],
    keys: &[
        "stat:monthly_stats",
        "stat:income",
        "stat:total_clients",
        "stat:sold_subs",
        "stat:new_clients",
        "stat:total_sold_subscriptions",
        "stat:total_income",
        keys::STAT_TOTAL_SINGLE_VISITS,
        keys::STAT_SINGLE_VISITS_INCOME,
    ],
};

/// Every cached person-subscription read.
pub const PERSON_SUBSCRIPTION_FAMILY: InvalidationSet = InvalidationSet {
    prefixes: &[keys::PERSON_SUB_PREFIX],
    keys: &[keys::PERSON_SUBS_ALL],
};

/// Best-effort cache invalidator.
///
/// Every method logs failures at `warn` and returns normally.
#[derive(Clone)]
pub struct CacheInvalidator {
    cache: Arc<dyn Cache>,
}

impl CacheInvalidator {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }

    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to delete cache key");
        }
    }

    pub async fn delete_prefix(&self, prefix: &str) {
        if let Err(e) = self.cache.delete_by_prefix(prefix).await {
            tracing::warn!(prefix = %prefix, error = %e, "Failed to delete cache prefix");
        }
    }

    /// Clears every prefix and key of `set`. One failure does not stop the
    /// rest.
    pub async fn invalidate(&self, set: &InvalidationSet) {
        for prefix in set.prefixes {
            self.delete_prefix(prefix).await;
        }
        for key in set.keys {
            self.delete(key).await;
        }
    }

    pub async fn statistics(&self) {
        self.invalidate(&STATISTICS_FAMILY).await;
    }
}

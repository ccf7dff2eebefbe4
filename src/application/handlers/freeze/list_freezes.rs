//! ListFreezesHandler - Freeze interval queries.

use std::sync::Arc;

use crate::application::cache::{keys, read_through};
use crate::domain::foundation::SubscriptionNumber;
use crate::domain::subscription::SubscriptionFreeze;
use crate::domain::GymError;
use crate::ports::{ActiveFreezeView, Cache, FreezeRepository, PersonSubscriptionRepository};

/// Queries over freeze intervals.
pub struct ListFreezesHandler {
    freezes: Arc<dyn FreezeRepository>,
    subscriptions: Arc<dyn PersonSubscriptionRepository>,
    cache: Arc<dyn Cache>,
}

impl ListFreezesHandler {
    pub fn new(
        freezes: Arc<dyn FreezeRepository>,
        subscriptions: Arc<dyn PersonSubscriptionRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            freezes,
            subscriptions,
            cache,
        }
    }

    /// Intervals of currently frozen subscriptions, newest first. Cached for
    /// 10 minutes.
    pub async fn active(&self) -> Result<Vec<ActiveFreezeView>, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::ACTIVE_FREEZES,
            keys::ENTITY_TTL,
            || async { self.freezes.list_active().await.map_err(GymError::from) },
        )
        .await
    }

    /// Full freeze history of one subscription, oldest first. Not cached.
    ///
    /// # Errors
    ///
    /// `SubscriptionNotFound` for an unknown number.
    pub async fn history(&self, number: &str) -> Result<Vec<SubscriptionFreeze>, GymError> {
        let number = SubscriptionNumber::new(number)?;
        if self.subscriptions.find_by_number(&number).await?.is_none() {
            return Err(GymError::SubscriptionNotFound(number.to_string()));
        }
        Ok(self.freezes.list_for_subscription(&number).await?)
    }
}

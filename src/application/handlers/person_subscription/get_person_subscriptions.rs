//! GetPersonSubscriptionsHandler - Cached subscription lookups.

use std::sync::Arc;

use crate::application::cache::{keys, read_through};
use crate::domain::foundation::{PersonId, SubscriptionNumber};
use crate::domain::GymError;
use crate::ports::{Cache, PersonSubscriptionRepository, PersonSubscriptionView};

/// Read-through lookups of person subscriptions.
///
/// Lists are cached for 30 minutes, single rows and person-scoped lists for
/// 10. Absent rows are never cached.
pub struct GetPersonSubscriptionsHandler {
    subscriptions: Arc<dyn PersonSubscriptionRepository>,
    cache: Arc<dyn Cache>,
}

impl GetPersonSubscriptionsHandler {
    pub fn new(
        subscriptions: Arc<dyn PersonSubscriptionRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            subscriptions,
            cache,
        }
    }

    /// # Errors
    ///
    /// `SubscriptionNotFound` when no subscription has this number.
    pub async fn by_number(&self, number: &str) -> Result<PersonSubscriptionView, GymError> {
        let number = SubscriptionNumber::new(number)?;
        read_through(
            self.cache.as_ref(),
            &keys::person_sub_by_number(&number),
            keys::ENTITY_TTL,
            || async {
                self.subscriptions
                    .find_by_number(&number)
                    .await
                    .map_err(GymError::from)?
                    .ok_or_else(|| GymError::SubscriptionNotFound(number.to_string()))
            },
        )
        .await
    }

    pub async fn all(&self) -> Result<Vec<PersonSubscriptionView>, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::PERSON_SUBS_ALL,
            keys::LIST_TTL,
            || async { self.subscriptions.list_all().await.map_err(GymError::from) },
        )
        .await
    }

    /// Subscriptions of the person with exactly this full name.
    ///
    /// # Errors
    ///
    /// `PersonNotFound` when nobody has that name.
    pub async fn by_person_name(
        &self,
        full_name: &str,
    ) -> Result<Vec<PersonSubscriptionView>, GymError> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(GymError::validation("name", "name is required"));
        }
        read_through(
            self.cache.as_ref(),
            &keys::person_subs_by_name(full_name),
            keys::ENTITY_TTL,
            || async {
                self.subscriptions
                    .find_by_person_name(full_name)
                    .await
                    .map_err(GymError::from)
            },
        )
        .await
    }

    /// # Errors
    ///
    /// `PersonNotFound` when the person does not exist.
    pub async fn by_person_id(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<PersonSubscriptionView>, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::person_subs_by_person_id(person_id),
            keys::ENTITY_TTL,
            || async {
                self.subscriptions
                    .find_by_person_id(person_id)
                    .await
                    .map_err(GymError::from)
            },
        )
        .await
    }
}

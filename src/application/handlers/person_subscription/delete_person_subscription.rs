//! DeletePersonSubscriptionHandler - Command handler for removing a subscription.

use std::sync::Arc;

use crate::application::cache::{keys, CacheInvalidator};
use crate::domain::foundation::SubscriptionNumber;
use crate::domain::GymError;
use crate::ports::{Cache, PersonSubscriptionRepository};

/// Command to delete a subscription and its freeze history.
#[derive(Debug, Clone)]
pub struct DeletePersonSubscriptionCommand {
    pub number: String,
}

/// Handler for deleting subscriptions.
///
/// The row is read first only to learn its owner for cache invalidation. A
/// missing row at that point is not an error by itself: the delete runs
/// anyway and its affected-row check decides between success and
/// `SubscriptionNotFound`.
pub struct DeletePersonSubscriptionHandler {
    subscriptions: Arc<dyn PersonSubscriptionRepository>,
    invalidator: CacheInvalidator,
}

impl DeletePersonSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn PersonSubscriptionRepository>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            subscriptions,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    pub async fn handle(&self, cmd: DeletePersonSubscriptionCommand) -> Result<(), GymError> {
        let number = SubscriptionNumber::new(cmd.number)?;

        let existing = self.subscriptions.find_by_number(&number).await?;
        if existing.is_none() {
            tracing::debug!(number = %number, "Subscription missing before delete");
        }

        self.subscriptions.delete(&number).await?;

        tracing::info!(number = %number, "Person subscription deleted");

        self.invalidator
            .delete(&keys::person_sub_by_number(&number))
            .await;
        if let Some(view) = existing {
            self.invalidator
                .delete(&keys::person_subs_by_name(&view.person_name))
                .await;
            self.invalidator
                .delete(&keys::person_subs_by_person_id(view.person_id))
                .await;
        }
        self.invalidator.delete(keys::PERSON_SUBS_ALL).await;
        self.invalidator.delete(keys::ACTIVE_FREEZES).await;
        self.invalidator.statistics().await;

        Ok(())
    }
}

//! FreezeSubscriptionHandler - Command handler for suspending a subscription.

use std::sync::Arc;

use crate::application::cache::{keys, CacheInvalidator, PERSON_SUBSCRIPTION_FAMILY};
use crate::domain::foundation::{parse_optional_date, FieldErrors, SubscriptionNumber};
use crate::domain::subscription::SubscriptionFreeze;
use crate::domain::GymError;
use crate::ports::{Cache, Clock, FreezeRepository};

/// Command to open a freeze interval.
#[derive(Debug, Clone)]
pub struct FreezeSubscriptionCommand {
    pub number: String,
    /// `YYYY-MM-DD`; today when absent.
    pub freeze_start: Option<String>,
}

/// Handler for freezing subscriptions.
///
/// The quota check and both writes happen inside the storage transaction;
/// this handler validates input and clears caches afterwards.
pub struct FreezeSubscriptionHandler {
    freezes: Arc<dyn FreezeRepository>,
    invalidator: CacheInvalidator,
    clock: Arc<dyn Clock>,
}

impl FreezeSubscriptionHandler {
    pub fn new(
        freezes: Arc<dyn FreezeRepository>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            freezes,
            invalidator: CacheInvalidator::new(cache),
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: FreezeSubscriptionCommand,
    ) -> Result<SubscriptionFreeze, GymError> {
        let mut errors = FieldErrors::new();
        let number = SubscriptionNumber::new(cmd.number)
            .map_err(|e| errors.add_error(&e))
            .ok();
        let freeze_start = parse_optional_date("freeze_start", cmd.freeze_start.as_deref())
            .map_err(|e| errors.add_error(&e))
            .ok()
            .flatten();
        errors.into_result()?;
        let number = number.ok_or_else(|| GymError::validation("number", "number is required"))?;

        let today = self.clock.today();
        let freeze = self
            .freezes
            .freeze(&number, freeze_start.unwrap_or(today), today)
            .await?;

        tracing::info!(
            number = %number,
            freeze_start = %freeze.freeze_start,
            "Subscription frozen"
        );

        invalidate_after_freeze_change(&self.invalidator).await;
        Ok(freeze)
    }
}

/// Caches a freeze or unfreeze can stale: the freeze lists, every
/// subscription read and the statistics.
pub(super) async fn invalidate_after_freeze_change(invalidator: &CacheInvalidator) {
    invalidator.delete_prefix(keys::FREEZE_PREFIX).await;
    invalidator.invalidate(&PERSON_SUBSCRIPTION_FAMILY).await;
    invalidator.statistics().await;
}

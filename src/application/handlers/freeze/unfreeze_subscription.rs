//! UnfreezeSubscriptionHandler - Command handler for ending a freeze.

use std::sync::Arc;

use crate::application::cache::CacheInvalidator;
use crate::domain::foundation::{parse_optional_date, FieldErrors, SubscriptionNumber};
use crate::domain::subscription::SubscriptionFreeze;
use crate::domain::GymError;
use crate::ports::{Cache, Clock, FreezeRepository};

use super::freeze_subscription::invalidate_after_freeze_change;

/// Command to close the open freeze interval.
#[derive(Debug, Clone)]
pub struct UnfreezeSubscriptionCommand {
    pub number: String,
    /// `YYYY-MM-DD`; today when absent.
    pub unfreeze_date: Option<String>,
}

/// Handler for unfreezing subscriptions.
///
/// Storage closes the interval, records the days used, pushes the end date
/// back by the same amount and reactivates the subscription in one
/// transaction.
pub struct UnfreezeSubscriptionHandler {
    freezes: Arc<dyn FreezeRepository>,
    invalidator: CacheInvalidator,
    clock: Arc<dyn Clock>,
}

impl UnfreezeSubscriptionHandler {
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
        cmd: UnfreezeSubscriptionCommand,
    ) -> Result<SubscriptionFreeze, GymError> {
        let mut errors = FieldErrors::new();
        let number = SubscriptionNumber::new(cmd.number)
            .map_err(|e| errors.add_error(&e))
            .ok();
        let unfreeze_date = parse_optional_date("unfreeze_date", cmd.unfreeze_date.as_deref())
            .map_err(|e| errors.add_error(&e))
            .ok()
            .flatten();
        errors.into_result()?;
        let number = number.ok_or_else(|| GymError::validation("number", "number is required"))?;

        let freeze = self
            .freezes
            .unfreeze(&number, unfreeze_date.unwrap_or_else(|| self.clock.today()))
            .await?;

        tracing::info!(
            number = %number,
            days_used = freeze.days_used,
            "Subscription unfrozen"
        );

        invalidate_after_freeze_change(&self.invalidator).await;
        Ok(freeze)
    }
}

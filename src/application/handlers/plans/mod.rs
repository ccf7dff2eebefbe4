//! Subscription plan handlers.
//!
//! Plan title, price and freeze quota appear in subscription views and the
//! income figures, so mutations clear plan caches, person-subscription
//! caches and the statistics family.

use std::sync::Arc;

use crate::application::cache::{keys, read_through, CacheInvalidator, PERSON_SUBSCRIPTION_FAMILY};
use crate::domain::foundation::PlanId;
use crate::domain::plans::{PlanDetails, SubscriptionPlan};
use crate::domain::GymError;
use crate::ports::{Cache, PlanRepository};

/// Plan fields as submitted.
#[derive(Debug, Clone)]
pub struct PlanCommand {
    pub title: String,
    pub price: i64,
    pub duration_days: i64,
    pub freeze_days: i64,
}

impl PlanCommand {
    fn details(&self) -> Result<PlanDetails, GymError> {
        Ok(PlanDetails::new(
            &self.title,
            self.price,
            self.duration_days,
            self.freeze_days,
        )?)
    }
}

/// Add, update and delete plans.
pub struct PlanCommandsHandler {
    plans: Arc<dyn PlanRepository>,
    invalidator: CacheInvalidator,
}

impl PlanCommandsHandler {
    pub fn new(plans: Arc<dyn PlanRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            plans,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    pub async fn add(&self, cmd: PlanCommand) -> Result<PlanId, GymError> {
        let id = self.plans.save(&cmd.details()?).await?;
        tracing::info!(plan_id = %id, title = %cmd.title, "Plan added");
        self.invalidate().await;
        Ok(id)
    }

    pub async fn update(&self, id: PlanId, cmd: PlanCommand) -> Result<(), GymError> {
        self.plans.update(&cmd.details()?.into_plan(id)).await?;
        tracing::info!(plan_id = %id, "Plan updated");
        self.invalidate().await;
        Ok(())
    }

    /// # Errors
    ///
    /// `PlanInUse` while subscriptions reference the plan.
    pub async fn delete(&self, id: PlanId) -> Result<(), GymError> {
        self.plans.delete(id).await?;
        tracing::info!(plan_id = %id, "Plan deleted");
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        self.invalidator.delete_prefix(keys::PLANS_PREFIX).await;
        self.invalidator.invalidate(&PERSON_SUBSCRIPTION_FAMILY).await;
        self.invalidator.statistics().await;
    }
}

/// Cached plan lookups.
pub struct PlanQueries {
    plans: Arc<dyn PlanRepository>,
    cache: Arc<dyn Cache>,
}

impl PlanQueries {
    pub fn new(plans: Arc<dyn PlanRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { plans, cache }
    }

    pub async fn all(&self) -> Result<Vec<SubscriptionPlan>, GymError> {
        read_through(self.cache.as_ref(), keys::PLANS_ALL, keys::LIST_TTL, || async {
            self.plans.list_all().await.map_err(GymError::from)
        })
        .await
    }

    pub async fn by_id(&self, id: PlanId) -> Result<SubscriptionPlan, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::plan_by_id(id),
            keys::ENTITY_TTL,
            || async {
                self.plans
                    .find_by_id(id)
                    .await
                    .map_err(GymError::from)?
                    .ok_or_else(|| GymError::PlanNotFound(id.to_string()))
            },
        )
        .await
    }
}

//! Subscription plan repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::plans::{PlanDetails, SubscriptionPlan};

/// Repository port for subscription plans.
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn save(&self, details: &PlanDetails) -> Result<PlanId, DomainError>;

    /// # Errors
    ///
    /// - `PlanNotFound` if the id is unknown
    async fn update(&self, plan: &SubscriptionPlan) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `PlanNotFound` if the id is unknown
    /// - `PlanInUse` if subscriptions reference the plan
    async fn delete(&self, id: PlanId) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: PlanId) -> Result<Option<SubscriptionPlan>, DomainError>;

    /// All plans ordered by id.
    async fn list_all(&self) -> Result<Vec<SubscriptionPlan>, DomainError>;
}

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, PlanId};
use crate::domain::plans::{PlanDetails, SubscriptionPlan};
use crate::ports::PlanRepository;

use super::{plan_not_found, InMemoryStore};

#[async_trait]
impl PlanRepository for InMemoryStore {
    async fn save(&self, details: &PlanDetails) -> Result<PlanId, DomainError> {
        let mut state = self.state.write().await;
        let id = PlanId::new(state.next_id()).map_err(|e| DomainError::database(e.to_string()))?;
        state.plans.insert(id.as_i64(), details.clone().into_plan(id));
        Ok(id)
    }

    async fn update(&self, plan: &SubscriptionPlan) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.plans.get_mut(&plan.id.as_i64()) {
            Some(stored) => {
                *stored = plan.clone();
                Ok(())
            }
            None => Err(plan_not_found(plan.id)),
        }
    }

    async fn delete(&self, id: PlanId) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if !state.plans.contains_key(&id.as_i64()) {
            return Err(plan_not_found(id));
        }
        if state.subscriptions.values().any(|s| s.plan_id == id) {
            return Err(DomainError::new(
                ErrorCode::PlanInUse,
                format!("plan {} is referenced by subscriptions", id),
            )
            .with_detail("plan", id.to_string()));
        }
        state.plans.remove(&id.as_i64());
        Ok(())
    }

    async fn find_by_id(&self, id: PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
        Ok(self.state.read().await.plans.get(&id.as_i64()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<SubscriptionPlan>, DomainError> {
        Ok(self.state.read().await.plans.values().cloned().collect())
    }
}

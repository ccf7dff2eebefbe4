use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::domain::foundation::{add_days, DomainError, ErrorCode, FreezeId, SubscriptionNumber};
use crate::domain::subscription::{FreezePolicy, SubscriptionFreeze, SubscriptionStatus};
use crate::ports::{ActiveFreezeView, FreezeRepository};

use super::{subscription_not_found, InMemoryStore};

#[async_trait]
impl FreezeRepository for InMemoryStore {
    async fn freeze(
        &self,
        number: &SubscriptionNumber,
        freeze_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError> {
        let mut state = self.state.write().await;

        let sub = state
            .subscriptions
            .get(number.as_str())
            .ok_or_else(|| subscription_not_found(number))?;
        let quota_days = state
            .plans
            .get(&sub.plan_id.as_i64())
            .map(|p| p.freeze_days)
            .unwrap_or(0);

        FreezePolicy {
            quota_days,
            used_days: state.freezes_of(number).map(|f| f.days_counted(today)).sum(),
            status: sub.status,
            has_open_freeze: state.freezes_of(number).any(|f| f.is_open()),
            start_date: sub.start_date,
            end_date: sub.end_date,
        }
        .check(number, freeze_start, today)?;

        let id = FreezeId::new(state.next_id()).map_err(|e| DomainError::database(e.to_string()))?;
        let freeze = SubscriptionFreeze {
            id,
            subscription_number: number.clone(),
            freeze_start,
            freeze_end: None,
            days_used: 0,
            created_at: Utc::now(),
        };
        state.freezes.push(freeze.clone());
        if let Some(sub) = state.subscriptions.get_mut(number.as_str()) {
            sub.status = SubscriptionStatus::Frozen;
        }
        Ok(freeze)
    }

    async fn unfreeze(
        &self,
        number: &SubscriptionNumber,
        unfreeze_date: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError> {
        let mut state = self.state.write().await;

        let index = state
            .freezes
            .iter()
            .position(|f| &f.subscription_number == number && f.is_open())
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FreezeNotFound,
                    format!("subscription {} has no open freeze", number),
                )
                .with_detail("number", number.as_str())
            })?;

        let sub = state
            .subscriptions
            .get(number.as_str())
            .ok_or_else(|| subscription_not_found(number))?;
        let quota_days = state
            .plans
            .get(&sub.plan_id.as_i64())
            .map(|p| p.freeze_days)
            .unwrap_or(0);
        let used_before: i64 = state
            .freezes_of(number)
            .filter(|f| !f.is_open())
            .map(|f| f.days_used)
            .sum();

        let days = state.freezes[index].days_to_record(unfreeze_date, quota_days, used_before)?;
        let end_date = add_days(sub.end_date, days)
            .ok_or_else(|| DomainError::validation("unfreeze_date", "end_date out of range"))?;

        let freeze = &mut state.freezes[index];
        freeze.freeze_end = Some(unfreeze_date);
        freeze.days_used = days;
        let closed = freeze.clone();

        if let Some(sub) = state.subscriptions.get_mut(number.as_str()) {
            sub.end_date = end_date;
            sub.status = SubscriptionStatus::Active;
        }
        Ok(closed)
    }

    async fn list_active(&self) -> Result<Vec<ActiveFreezeView>, DomainError> {
        let state = self.state.read().await;
        let mut active: Vec<ActiveFreezeView> = state
            .freezes
            .iter()
            .filter_map(|f| {
                let sub = state.subscriptions.get(f.subscription_number.as_str())?;
                if sub.status != SubscriptionStatus::Frozen {
                    return None;
                }
                Some(ActiveFreezeView {
                    id: f.id,
                    subscription_number: f.subscription_number.clone(),
                    person_name: state
                        .people
                        .get(&sub.person_id.as_i64())
                        .map(|p| p.full_name.clone())
                        .unwrap_or_default(),
                    freeze_start: f.freeze_start,
                    freeze_end: f.freeze_end,
                    days_used: f.days_used,
                    created_at: f.created_at,
                })
            })
            .collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(active)
    }

    async fn list_for_subscription(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Vec<SubscriptionFreeze>, DomainError> {
        let state = self.state.read().await;
        let mut history: Vec<SubscriptionFreeze> = state.freezes_of(number).cloned().collect();
        history.sort_by(|a, b| a.freeze_start.cmp(&b.freeze_start).then(a.id.cmp(&b.id)));
        Ok(history)
    }
}

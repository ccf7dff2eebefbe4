use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, ErrorCode, PersonId, SubscriptionNumber};
use crate::domain::subscription::{PersonSubscription, SubscriptionStatus};
use crate::ports::{
    compare_numbers, PersonSubscriptionRepository, PersonSubscriptionView, StatusSnapshot,
};

use super::{person_not_found, plan_not_found, subscription_not_found, InMemoryStore, State};

impl State {
    fn view(&self, sub: &PersonSubscription, today: NaiveDate) -> PersonSubscriptionView {
        let person_name = self
            .people
            .get(&sub.person_id.as_i64())
            .map(|p| p.full_name.clone())
            .unwrap_or_default();
        let (title, freeze_days) = self
            .plans
            .get(&sub.plan_id.as_i64())
            .map(|p| (p.title.clone(), p.freeze_days))
            .unwrap_or_default();
        let used_freeze_days = self
            .freezes_of(&sub.number)
            .map(|f| f.days_counted(today))
            .sum();

        PersonSubscriptionView {
            number: sub.number.clone(),
            person_id: sub.person_id,
            person_name,
            subscription_id: sub.plan_id,
            subscription_title: title,
            subscription_price: sub.subscription_price,
            start_date: sub.start_date,
            end_date: sub.end_date,
            status: sub.status,
            discount: sub.discount,
            final_price: sub.final_price,
            freeze_days,
            used_freeze_days,
        }
    }

    fn views<'a>(
        &self,
        subs: impl Iterator<Item = &'a PersonSubscription>,
        today: NaiveDate,
    ) -> Vec<PersonSubscriptionView> {
        let mut views: Vec<PersonSubscriptionView> = subs.map(|s| self.view(s, today)).collect();
        views.sort_by(|a, b| compare_numbers(&a.number, &b.number));
        views
    }
}

#[async_trait]
impl PersonSubscriptionRepository for InMemoryStore {
    async fn save(&self, subscription: &PersonSubscription) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.subscriptions.contains_key(subscription.number.as_str()) {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                format!("subscription {} already exists", subscription.number),
            )
            .with_detail("number", subscription.number.as_str()));
        }
        if !state.people.contains_key(&subscription.person_id.as_i64()) {
            return Err(person_not_found(subscription.person_id));
        }
        if !state.plans.contains_key(&subscription.plan_id.as_i64()) {
            return Err(plan_not_found(subscription.plan_id));
        }
        state
            .subscriptions
            .insert(subscription.number.as_str().to_string(), subscription.clone());
        Ok(())
    }

    async fn delete(&self, number: &SubscriptionNumber) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.subscriptions.remove(number.as_str()).is_none() {
            return Err(subscription_not_found(number));
        }
        state.freezes.retain(|f| &f.subscription_number != number);
        Ok(())
    }

    async fn update_status(
        &self,
        number: &SubscriptionNumber,
        status: SubscriptionStatus,
    ) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        match state.subscriptions.get_mut(number.as_str()) {
            Some(sub) => {
                sub.status = status;
                Ok(())
            }
            None => Err(subscription_not_found(number)),
        }
    }

    async fn find_by_number(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Option<PersonSubscriptionView>, DomainError> {
        let today = self.clock.today();
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .get(number.as_str())
            .map(|s| state.view(s, today)))
    }

    async fn list_all(&self) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        let today = self.clock.today();
        let state = self.state.read().await;
        Ok(state.views(state.subscriptions.values(), today))
    }

    async fn find_by_person_name(
        &self,
        full_name: &str,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        let today = self.clock.today();
        let state = self.state.read().await;
        let owners: Vec<PersonId> = state
            .people
            .values()
            .filter(|p| p.full_name == full_name)
            .map(|p| p.id)
            .collect();
        if owners.is_empty() {
            return Err(person_not_found(full_name));
        }
        Ok(state.views(
            state
                .subscriptions
                .values()
                .filter(|s| owners.contains(&s.person_id)),
            today,
        ))
    }

    async fn find_by_person_id(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        let today = self.clock.today();
        let state = self.state.read().await;
        if !state.people.contains_key(&person_id.as_i64()) {
            return Err(person_not_found(person_id));
        }
        Ok(state.views(
            state
                .subscriptions
                .values()
                .filter(|s| s.person_id == person_id),
            today,
        ))
    }

    async fn list_status_snapshots(&self) -> Result<Vec<StatusSnapshot>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .values()
            .map(|s| StatusSnapshot {
                number: s.number.clone(),
                person_id: s.person_id,
                person_name: state
                    .people
                    .get(&s.person_id.as_i64())
                    .map(|p| p.full_name.clone())
                    .unwrap_or_default(),
                start_date: s.start_date,
                end_date: s.end_date,
                status: s.status,
                has_open_freeze: state.freezes_of(&s.number).any(|f| f.is_open()),
            })
            .collect())
    }
}

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::statistics::{
    month_start, DateRange, MonthlySubscriptionTotals, MonthlyVisitTotals,
};
use crate::domain::subscription::PersonSubscription;
use crate::ports::StatisticsReader;

use super::{InMemoryStore, State};

impl State {
    /// Plan price minus discount.
    fn income_of(&self, sub: &PersonSubscription) -> Money {
        let price = self
            .plans
            .get(&sub.plan_id.as_i64())
            .map(|p| p.price)
            .unwrap_or(Money::ZERO);
        price - sub.discount
    }

    fn subscriptions_in<'a>(
        &'a self,
        range: &'a DateRange,
    ) -> impl Iterator<Item = &'a PersonSubscription> + 'a {
        self.subscriptions
            .values()
            .filter(move |s| range.contains(s.start_date))
    }
}

#[async_trait]
impl StatisticsReader for InMemoryStore {
    async fn total_clients(&self) -> Result<i64, DomainError> {
        Ok(self.state.read().await.people.len() as i64)
    }

    async fn new_clients(&self, range: &DateRange) -> Result<i64, DomainError> {
        let state = self.state.read().await;
        let people: BTreeSet<_> = state.subscriptions_in(range).map(|s| s.person_id).collect();
        Ok(people.len() as i64)
    }

    async fn total_income(&self) -> Result<Money, DomainError> {
        let state = self.state.read().await;
        Ok(state.subscriptions.values().map(|s| state.income_of(s)).sum())
    }

    async fn income(&self, range: &DateRange) -> Result<Money, DomainError> {
        let state = self.state.read().await;
        Ok(state.subscriptions_in(range).map(|s| state.income_of(s)).sum())
    }

    async fn total_sold_subscriptions(&self) -> Result<i64, DomainError> {
        Ok(self.state.read().await.subscriptions.len() as i64)
    }

    async fn sold_subscriptions(&self, range: &DateRange) -> Result<i64, DomainError> {
        let state = self.state.read().await;
        Ok(state.subscriptions_in(range).count() as i64)
    }

    async fn total_single_visits(&self) -> Result<i64, DomainError> {
        Ok(self.state.read().await.visits.len() as i64)
    }

    async fn single_visits(&self, range: &DateRange) -> Result<i64, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .visits
            .values()
            .filter(|v| range.contains(v.visit_date))
            .count() as i64)
    }

    async fn single_visits_income(&self) -> Result<Money, DomainError> {
        let state = self.state.read().await;
        Ok(state.visits.values().map(|v| v.final_price).sum())
    }

    async fn monthly_subscription_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlySubscriptionTotals>, DomainError> {
        let state = self.state.read().await;
        let mut months: BTreeMap<_, (Money, BTreeSet<_>, i64)> = BTreeMap::new();
        for sub in state.subscriptions_in(range) {
            let entry = months
                .entry(month_start(sub.start_date))
                .or_insert_with(|| (Money::ZERO, BTreeSet::new(), 0));
            entry.0 = entry.0 + state.income_of(sub);
            entry.1.insert(sub.person_id);
            entry.2 += 1;
        }
        Ok(months
            .into_iter()
            .map(|(month, (income, people, sold))| MonthlySubscriptionTotals {
                month,
                income,
                new_clients: people.len() as i64,
                sold_subscriptions: sold,
            })
            .collect())
    }

    async fn monthly_visit_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyVisitTotals>, DomainError> {
        let state = self.state.read().await;
        let mut months: BTreeMap<_, (Money, i64)> = BTreeMap::new();
        for visit in state.visits.values().filter(|v| range.contains(v.visit_date)) {
            let entry = months
                .entry(month_start(visit.visit_date))
                .or_insert((Money::ZERO, 0));
            entry.0 = entry.0 + visit.final_price;
            entry.1 += 1;
        }
        Ok(months
            .into_iter()
            .map(|(month, (income, count))| MonthlyVisitTotals { month, income, count })
            .collect())
    }
}

//! In-memory storage adapter.
//!
//! `InMemoryStore` implements every storage port over one shared state
//! behind a single lock, so multi-row operations such as freeze and
//! unfreeze are atomic exactly like their PostgreSQL counterparts. It
//! reports the same sentinel errors as the PostgreSQL adapters.
//!
//! Used by the test suites and for running the API without a database.

mod freezes;
mod people;
mod plans;
mod statistics;
mod subscriptions;
mod visits;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, PersonId, PlanId, SubscriptionNumber};
use crate::domain::people::Person;
use crate::domain::plans::SubscriptionPlan;
use crate::domain::subscription::{PersonSubscription, SubscriptionFreeze};
use crate::domain::visits::SingleVisit;
use crate::ports::Clock;

/// Shared in-memory storage for people, plans, subscriptions, freezes and
/// single visits.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
}

#[derive(Debug, Default)]
struct State {
    people: BTreeMap<i64, Person>,
    plans: BTreeMap<i64, SubscriptionPlan>,
    subscriptions: BTreeMap<String, PersonSubscription>,
    freezes: Vec<SubscriptionFreeze>,
    visits: BTreeMap<i64, SingleVisit>,
    last_id: i64,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn freezes_of<'a>(
        &'a self,
        number: &'a SubscriptionNumber,
    ) -> impl Iterator<Item = &'a SubscriptionFreeze> + 'a {
        self.freezes
            .iter()
            .filter(move |f| &f.subscription_number == number)
    }
}

impl InMemoryStore {
    /// Creates an empty store. `clock` decides how far open freeze intervals
    /// count.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock,
        }
    }

    /// Number of stored freeze rows, open or closed.
    pub async fn freeze_count(&self) -> usize {
        self.state.read().await.freezes.len()
    }

    /// Number of stored subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.state.read().await.subscriptions.len()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

fn person_not_found(person: impl ToString) -> DomainError {
    let person = person.to_string();
    DomainError::new(ErrorCode::PersonNotFound, format!("person {} not found", person))
        .with_detail("person", person)
}

fn plan_not_found(id: PlanId) -> DomainError {
    DomainError::new(ErrorCode::PlanNotFound, format!("plan {} not found", id))
        .with_detail("plan", id.to_string())
}

fn subscription_not_found(number: &SubscriptionNumber) -> DomainError {
    DomainError::new(
        ErrorCode::SubscriptionNotFound,
        format!("subscription {} not found", number),
    )
    .with_detail("number", number.as_str())
}

fn person_id_of(id: i64) -> Result<PersonId, DomainError> {
    PersonId::new(id).map_err(|e| DomainError::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::domain::foundation::Money;
    use crate::domain::people::PersonDetails;
    use crate::domain::plans::PlanDetails;
    use crate::domain::statistics::DateRange;
    use crate::domain::subscription::SubscriptionStatus;
    use crate::ports::{
        FreezeRepository, PersonRepository, PersonSubscriptionRepository, PlanRepository,
        StatisticsReader,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn number(s: &str) -> SubscriptionNumber {
        SubscriptionNumber::new(s).unwrap()
    }

    struct Fixture {
        store: InMemoryStore,
        person: PersonId,
        plan: PlanId,
    }

    async fn fixture(freeze_days: i64) -> Fixture {
        let store = InMemoryStore::new(Arc::new(FixedClock::new(date(2024, 3, 10))));
        let person = PersonRepository::save(
            &store,
            &PersonDetails::new("John Doe", "+7 900 000-00-01").unwrap(),
        )
        .await
        .unwrap();
        let plan = PlanRepository::save(
            &store,
            &PlanDetails::new("Monthly", 1_000, 30, freeze_days).unwrap(),
        )
        .await
        .unwrap();
        Fixture { store, person, plan }
    }

    fn subscription(f: &Fixture, n: &str, start: NaiveDate, discount: i64) -> PersonSubscription {
        PersonSubscription {
            number: number(n),
            person_id: f.person,
            plan_id: f.plan,
            subscription_price: Money::from_minor(1_000),
            start_date: start,
            end_date: start + chrono::Duration::days(30),
            status: SubscriptionStatus::Active,
            discount: Money::from_minor(discount),
            final_price: Money::from_minor(1_000 - discount),
        }
    }

    #[tokio::test]
    async fn duplicate_number_is_reported_as_exists() {
        let f = fixture(5).await;
        let sub = subscription(&f, "1001", date(2024, 3, 1), 0);
        PersonSubscriptionRepository::save(&f.store, &sub).await.unwrap();

        let err = PersonSubscriptionRepository::save(&f.store, &sub).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SubscriptionExists);
        assert_eq!(err.detail("number"), Some("1001"));
    }

    #[tokio::test]
    async fn unknown_person_is_reported_as_not_found() {
        let f = fixture(5).await;
        let mut sub = subscription(&f, "1001", date(2024, 3, 1), 0);
        sub.person_id = PersonId::new(999).unwrap();

        let err = PersonSubscriptionRepository::save(&f.store, &sub).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersonNotFound);
    }

    #[tokio::test]
    async fn deleting_person_with_subscriptions_is_refused() {
        let f = fixture(5).await;
        PersonSubscriptionRepository::save(&f.store, &subscription(&f, "1001", date(2024, 3, 1), 0))
            .await
            .unwrap();

        let err = PersonRepository::delete(&f.store, f.person).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PersonInUse);
    }

    #[tokio::test]
    async fn unfreeze_extends_end_date_and_deleting_drops_history() {
        let f = fixture(10).await;
        PersonSubscriptionRepository::save(&f.store, &subscription(&f, "1001", date(2024, 3, 1), 0))
            .await
            .unwrap();

        f.store
            .freeze(&number("1001"), date(2024, 3, 5), date(2024, 3, 10))
            .await
            .unwrap();
        let closed = f.store.unfreeze(&number("1001"), date(2024, 3, 8)).await.unwrap();
        assert_eq!(closed.days_used, 3);

        let view = f.store.find_by_number(&number("1001")).await.unwrap().unwrap();
        assert_eq!(view.end_date, date(2024, 4, 3));
        assert_eq!(view.status, SubscriptionStatus::Active);
        assert_eq!(view.used_freeze_days, 3);

        PersonSubscriptionRepository::delete(&f.store, &number("1001")).await.unwrap();
        assert_eq!(f.store.freeze_count().await, 0);
    }

    #[tokio::test]
    async fn long_freeze_is_credited_only_up_to_the_quota() {
        let f = fixture(3).await;
        PersonSubscriptionRepository::save(&f.store, &subscription(&f, "1001", date(2024, 3, 1), 0))
            .await
            .unwrap();

        f.store
            .freeze(&number("1001"), date(2024, 3, 10), date(2024, 3, 10))
            .await
            .unwrap();
        let closed = f.store.unfreeze(&number("1001"), date(2024, 3, 30)).await.unwrap();
        assert_eq!(closed.days_used, 3);
        assert_eq!(closed.freeze_end, Some(date(2024, 3, 30)));

        let view = f.store.find_by_number(&number("1001")).await.unwrap().unwrap();
        assert_eq!(view.end_date, date(2024, 4, 3));
        assert_eq!(view.used_freeze_days, 3);
    }

    #[tokio::test]
    async fn backdated_freeze_start_is_checked_under_the_lock() {
        let f = fixture(3).await;
        PersonSubscriptionRepository::save(&f.store, &subscription(&f, "1001", date(2024, 3, 5), 0))
            .await
            .unwrap();

        let err = f
            .store
            .freeze(&number("1001"), date(2024, 1, 1), date(2024, 3, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let err = f
            .store
            .freeze(&number("1001"), date(2024, 3, 6), date(2024, 3, 10))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeQuotaExhausted);
        assert_eq!(f.store.freeze_count().await, 0);
    }

    #[tokio::test]
    async fn income_is_plan_price_minus_discount() {
        let f = fixture(0).await;
        for (n, start, discount) in [
            ("1", date(2024, 1, 15), 100),
            ("2", date(2024, 2, 1), 0),
            ("3", date(2024, 2, 20), 250),
        ] {
            PersonSubscriptionRepository::save(&f.store, &subscription(&f, n, start, discount))
                .await
                .unwrap();
        }

        let feb = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert_eq!(f.store.total_income().await.unwrap(), Money::from_minor(2_650));
        assert_eq!(f.store.income(&feb).await.unwrap(), Money::from_minor(1_750));
        assert_eq!(f.store.sold_subscriptions(&feb).await.unwrap(), 2);
        assert_eq!(f.store.new_clients(&feb).await.unwrap(), 1);

        let monthly = f.store.monthly_subscription_totals(&feb).await.unwrap();
        assert_eq!(monthly.len(), 1);
        assert_eq!(monthly[0].sold_subscriptions, 2);
        assert_eq!(monthly[0].new_clients, 1);
    }
}

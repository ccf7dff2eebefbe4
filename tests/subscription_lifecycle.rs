//! Integration tests for the subscription lifecycle.
//!
//! Drives the application handlers over the in-memory store and cache with a
//! movable clock: sale, freeze, unfreeze, quota exhaustion and the daily
//! status refresh.

use std::sync::Arc;

use chrono::NaiveDate;

use gym_membership::adapters::auth::MockIdentityProvider;
use gym_membership::adapters::clock::FixedClock;
use gym_membership::adapters::http::AppState;
use gym_membership::application::handlers::{
    AddPersonCommand, AddPersonSubscriptionCommand, DeletePersonSubscriptionCommand,
    FreezeSubscriptionCommand, PlanCommand, UnfreezeSubscriptionCommand,
};
use gym_membership::domain::foundation::{PersonId, PlanId};
use gym_membership::domain::subscription::{PersonSubscriptionDraft, SubscriptionStatus};
use gym_membership::domain::{ErrorKind, GymError};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

struct Gym {
    state: AppState,
    clock: Arc<FixedClock>,
}

impl Gym {
    fn open(today: NaiveDate) -> Self {
        let clock = Arc::new(FixedClock::new(today));
        let state = AppState::in_memory(
            Arc::new(MockIdentityProvider::new()),
            clock.clone(),
            "admin",
        );
        Self { state, clock }
    }

    async fn person(&self, name: &str, phone: &str) -> PersonId {
        self.state
            .add_person_handler()
            .handle(AddPersonCommand {
                full_name: name.to_string(),
                phone: phone.to_string(),
            })
            .await
            .unwrap()
    }

    async fn plan(&self, duration_days: i64, freeze_days: i64) -> PlanId {
        self.state
            .plan_commands()
            .add(PlanCommand {
                title: format!("{} days", duration_days),
                price: 3000,
                duration_days,
                freeze_days,
            })
            .await
            .unwrap()
    }

    async fn sell(&self, number: &str, person: PersonId, plan: PlanId, start: Option<&str>) {
        self.state
            .add_person_subscription_handler()
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft {
                    number: number.to_string(),
                    person_id: Some(person.as_i64()),
                    subscription_id: Some(plan.as_i64()),
                    start_date: start.map(str::to_string),
                    ..Default::default()
                },
            })
            .await
            .unwrap();
    }

    async fn freeze(&self, number: &str) -> Result<(), GymError> {
        self.freeze_from(number, None).await
    }

    async fn freeze_from(&self, number: &str, start: Option<&str>) -> Result<(), GymError> {
        self.state
            .freeze_handler()
            .handle(FreezeSubscriptionCommand {
                number: number.to_string(),
                freeze_start: start.map(str::to_string),
            })
            .await
            .map(|_| ())
    }

    async fn unfreeze(&self, number: &str) -> Result<i64, GymError> {
        self.state
            .unfreeze_handler()
            .handle(UnfreezeSubscriptionCommand {
                number: number.to_string(),
                unfreeze_date: None,
            })
            .await
            .map(|f| f.days_used)
    }

    async fn status(&self, number: &str) -> SubscriptionStatus {
        self.state
            .person_subscription_queries()
            .by_number(number)
            .await
            .unwrap()
            .status
    }
}

// =============================================================================
// Sale
// =============================================================================

#[tokio::test]
async fn sale_defaults_dates_from_plan() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    let view = gym
        .state
        .person_subscription_queries()
        .by_number("1001")
        .await
        .unwrap();
    assert_eq!(view.start_date, date(2024, 3, 1));
    assert_eq!(view.end_date, date(2024, 3, 31));
    assert_eq!(view.status, SubscriptionStatus::Active);
    assert_eq!(view.person_name, "Ann Lee");
}

#[tokio::test]
async fn future_start_is_frozen_until_it_begins() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, Some("2024-03-05")).await;
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Frozen);

    gym.clock.set(date(2024, 3, 5));
    let report = gym.state.refresh_statuses_handler().handle().await.unwrap();
    assert_eq!(report.updated, 1);
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Active);
}

#[tokio::test]
async fn duplicate_number_conflicts() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    let err = gym
        .state
        .add_person_subscription_handler()
        .handle(AddPersonSubscriptionCommand {
            draft: PersonSubscriptionDraft {
                number: "1001".to_string(),
                person_id: Some(ann.as_i64()),
                subscription_id: Some(month.as_i64()),
                ..Default::default()
            },
        })
        .await
        .unwrap_err();
    assert_eq!(err, GymError::SubscriptionExists("1001".to_string()));
}

// =============================================================================
// Freeze and unfreeze
// =============================================================================

#[tokio::test]
async fn unfreeze_extends_end_date_by_days_frozen() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    gym.clock.set(date(2024, 3, 10));
    gym.freeze("1001").await.unwrap();
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Frozen);

    gym.clock.set(date(2024, 3, 14));
    assert_eq!(gym.unfreeze("1001").await.unwrap(), 4);

    let view = gym
        .state
        .person_subscription_queries()
        .by_number("1001")
        .await
        .unwrap();
    assert_eq!(view.status, SubscriptionStatus::Active);
    assert_eq!(view.end_date, date(2024, 4, 4));
    assert_eq!(view.used_freeze_days, 4);

    let history = gym.state.list_freezes_handler().history("1001").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].freeze_end, Some(date(2024, 3, 14)));
}

#[tokio::test]
async fn second_open_freeze_conflicts() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    gym.freeze("1001").await.unwrap();
    let err = gym.freeze("1001").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err, GymError::FreezeAlreadyOpen("1001".to_string()));
}

#[tokio::test]
async fn quota_runs_out() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let plan = gym.plan(30, 3).await;
    gym.sell("1001", ann, plan, None).await;

    gym.freeze("1001").await.unwrap();
    gym.clock.set(date(2024, 3, 4));
    assert_eq!(gym.unfreeze("1001").await.unwrap(), 3);

    let err = gym.freeze("1001").await.unwrap_err();
    assert!(matches!(err, GymError::FreezeQuotaExhausted { .. }));
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn unfreeze_past_quota_credits_only_the_quota() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let plan = gym.plan(30, 3).await;
    gym.sell("1001", ann, plan, None).await;

    gym.freeze("1001").await.unwrap();
    gym.clock.set(date(2024, 3, 31));
    assert_eq!(gym.unfreeze("1001").await.unwrap(), 3);

    let view = gym
        .state
        .person_subscription_queries()
        .by_number("1001")
        .await
        .unwrap();
    assert_eq!(view.end_date, date(2024, 4, 3));
    assert_eq!(view.used_freeze_days, 3);
    assert_eq!(view.status, SubscriptionStatus::Active);

    let err = gym.freeze("1001").await.unwrap_err();
    assert!(matches!(err, GymError::FreezeQuotaExhausted { .. }));
}

#[tokio::test]
async fn freeze_start_must_fall_inside_the_subscription() {
    let gym = Gym::open(date(2024, 3, 20));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let plan = gym.plan(30, 3).await;
    gym.sell("1001", ann, plan, Some("2024-03-15")).await;

    for start in ["2024-01-01", "2024-03-14", "2024-04-15"] {
        let err = gym.freeze_from("1001", Some(start)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.fields().is_some_and(|f| f.contains("freeze_start")));
    }

    assert_eq!(gym.status("1001").await, SubscriptionStatus::Active);
    assert!(gym.state.list_freezes_handler().history("1001").await.unwrap().is_empty());
}

#[tokio::test]
async fn backdated_freeze_spends_quota_up_to_today() {
    let gym = Gym::open(date(2024, 3, 20));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let plan = gym.plan(30, 3).await;
    gym.sell("1001", ann, plan, Some("2024-03-15")).await;

    let err = gym.freeze_from("1001", Some("2024-03-16")).await.unwrap_err();
    assert!(matches!(err, GymError::FreezeQuotaExhausted { .. }));
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Active);

    gym.freeze_from("1001", Some("2024-03-18")).await.unwrap();
    gym.clock.set(date(2024, 4, 20));
    assert_eq!(gym.unfreeze("1001").await.unwrap(), 3);

    let view = gym
        .state
        .person_subscription_queries()
        .by_number("1001")
        .await
        .unwrap();
    assert_eq!(view.end_date, date(2024, 4, 17));
}

#[tokio::test]
async fn plan_without_freeze_days_cannot_freeze() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let plan = gym.plan(30, 0).await;
    gym.sell("1001", ann, plan, None).await;

    let err = gym.freeze("1001").await.unwrap_err();
    assert_eq!(err, GymError::FreezeNotSupported("1001".to_string()));
}

#[tokio::test]
async fn unfreeze_without_open_interval_is_not_found() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    let err = gym.unfreeze("1001").await.unwrap_err();
    assert_eq!(err, GymError::FreezeNotFound("1001".to_string()));
}

#[tokio::test]
async fn active_freezes_list_frozen_subscriptions_only() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let bob = gym.person("Bob Stone", "+7 900 000-02-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;
    gym.sell("1002", bob, month, None).await;

    assert!(gym.state.list_freezes_handler().active().await.unwrap().is_empty());
    gym.freeze("1002").await.unwrap();

    let active = gym.state.list_freezes_handler().active().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].subscription_number.as_str(), "1002");
    assert_eq!(active[0].person_name, "Bob Stone");
}

// =============================================================================
// Daily refresh
// =============================================================================

#[tokio::test]
async fn refresh_expires_and_is_idempotent() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    gym.clock.set(date(2024, 4, 1));
    let first = gym.state.refresh_statuses_handler().handle().await.unwrap();
    assert_eq!(first.updated, 1);
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Expired);

    let second = gym.state.refresh_statuses_handler().handle().await.unwrap();
    assert_eq!(second.examined, 1);
    assert_eq!(second.updated, 0);
}

#[tokio::test]
async fn refresh_keeps_open_freeze_frozen() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;
    gym.freeze("1001").await.unwrap();

    gym.clock.set(date(2024, 3, 5));
    gym.state.refresh_statuses_handler().handle().await.unwrap();
    assert_eq!(gym.status("1001").await, SubscriptionStatus::Frozen);
}

// =============================================================================
// Deletion
// =============================================================================

#[tokio::test]
async fn person_with_subscriptions_cannot_be_deleted() {
    let gym = Gym::open(date(2024, 3, 1));
    let ann = gym.person("Ann Lee", "+7 900 000-01-00").await;
    let month = gym.plan(30, 10).await;
    gym.sell("1001", ann, month, None).await;

    let err = gym.state.delete_person_handler().handle(ann).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    gym.state
        .delete_person_subscription_handler()
        .handle(DeletePersonSubscriptionCommand {
            number: "1001".to_string(),
        })
        .await
        .unwrap();
    gym.state.delete_person_handler().handle(ann).await.unwrap();
}

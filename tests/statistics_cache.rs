//! Integration tests for statistics and their cache.
//!
//! Statistics are read through the cache; every write that changes an
//! aggregate must invalidate it so the next read sees fresh numbers.

use std::sync::Arc;

use chrono::NaiveDate;

use gym_membership::adapters::auth::MockIdentityProvider;
use gym_membership::adapters::clock::FixedClock;
use gym_membership::adapters::http::AppState;
use gym_membership::application::cache::keys;
use gym_membership::application::handlers::{
    AddPersonCommand, AddPersonSubscriptionCommand, AddSingleVisitCommand, PlanCommand,
};
use gym_membership::domain::foundation::{Money, PlanId};
use gym_membership::domain::statistics::DateRange;
use gym_membership::domain::subscription::PersonSubscriptionDraft;
use gym_membership::ports::Cache;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn state(today: NaiveDate) -> AppState {
    AppState::in_memory(
        Arc::new(MockIdentityProvider::new()),
        Arc::new(FixedClock::new(today)),
        "admin",
    )
}

async fn plan(state: &AppState, price: i64) -> PlanId {
    state
        .plan_commands()
        .add(PlanCommand {
            title: "Month".to_string(),
            price,
            duration_days: 30,
            freeze_days: 7,
        })
        .await
        .unwrap()
}

async fn sell(state: &AppState, number: &str, phone: &str, plan: PlanId, start: &str, discount: i64) {
    let person = state
        .add_person_handler()
        .handle(AddPersonCommand {
            full_name: format!("Member {}", number),
            phone: phone.to_string(),
        })
        .await
        .unwrap();
    state
        .add_person_subscription_handler()
        .handle(AddPersonSubscriptionCommand {
            draft: PersonSubscriptionDraft {
                number: number.to_string(),
                person_id: Some(person.as_i64()),
                subscription_id: Some(plan.as_i64()),
                start_date: Some(start.to_string()),
                discount: Some(discount),
                ..Default::default()
            },
        })
        .await
        .unwrap();
}

async fn visit(state: &AppState, day: &str, price: i64) {
    state
        .single_visit_commands()
        .add(AddSingleVisitCommand {
            visit_date: Some(day.to_string()),
            final_price: price,
        })
        .await
        .unwrap();
}

// =============================================================================
// Invalidation
// =============================================================================

#[tokio::test]
async fn sale_invalidates_cached_totals() {
    let state = state(date(2024, 3, 10));
    let month = plan(&state, 3000).await;
    let stats = state.statistics_handler();

    assert_eq!(stats.total_sold_subscriptions().await.unwrap(), 0);
    assert!(state
        .cache
        .get(keys::STAT_TOTAL_SOLD_SUBSCRIPTIONS)
        .await
        .unwrap()
        .is_some());

    sell(&state, "1001", "+7 900 000-01-00", month, "2024-03-01", 500).await;

    assert_eq!(stats.total_sold_subscriptions().await.unwrap(), 1);
    assert_eq!(stats.total_income().await.unwrap(), Money::from_minor(2500));
    assert_eq!(stats.total_clients().await.unwrap(), 1);
}

#[tokio::test]
async fn visit_invalidates_cached_visit_figures() {
    let state = state(date(2024, 3, 10));
    let stats = state.statistics_handler();

    assert_eq!(stats.total_single_visits().await.unwrap(), 0);
    assert_eq!(stats.single_visits_income().await.unwrap(), Money::ZERO);

    visit(&state, "2024-03-02", 400).await;
    visit(&state, "2024-03-03", 600).await;

    assert_eq!(stats.total_single_visits().await.unwrap(), 2);
    assert_eq!(stats.single_visits_income().await.unwrap(), Money::from_minor(1000));
}

#[tokio::test]
async fn plan_price_change_invalidates_income() {
    let state = state(date(2024, 3, 10));
    let month = plan(&state, 3000).await;
    sell(&state, "1001", "+7 900 000-01-00", month, "2024-03-01", 0).await;
    let stats = state.statistics_handler();
    assert_eq!(stats.total_income().await.unwrap(), Money::from_minor(3000));

    state
        .plan_commands()
        .update(
            month,
            PlanCommand {
                title: "Month".to_string(),
                price: 4000,
                duration_days: 30,
                freeze_days: 7,
            },
        )
        .await
        .unwrap();

    assert_eq!(stats.total_income().await.unwrap(), Money::from_minor(4000));
}

// =============================================================================
// Ranges and monthly rollup
// =============================================================================

#[tokio::test]
async fn ranged_figures_are_inclusive() {
    let state = state(date(2024, 4, 10));
    let month = plan(&state, 3000).await;
    sell(&state, "1001", "+7 900 000-01-00", month, "2024-03-01", 0).await;
    sell(&state, "1002", "+7 900 000-02-00", month, "2024-03-31", 1000).await;
    sell(&state, "1003", "+7 900 000-03-00", month, "2024-04-01", 0).await;

    let march = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
    let stats = state.statistics_handler();
    assert_eq!(stats.sold_subscriptions(&march).await.unwrap(), 2);
    assert_eq!(stats.new_clients(&march).await.unwrap(), 2);
    assert_eq!(stats.income(&march).await.unwrap(), Money::from_minor(5000));
}

#[tokio::test]
async fn monthly_rollup_fills_empty_months() {
    let state = state(date(2024, 4, 10));
    let month = plan(&state, 3000).await;
    sell(&state, "1001", "+7 900 000-01-00", month, "2024-01-15", 0).await;
    visit(&state, "2024-03-02", 500).await;

    let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
    let rows = state.statistics_handler().monthly(&range).await.unwrap();

    let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(rows[0].sold_subscriptions, 1);
    assert_eq!(rows[0].income, Money::from_minor(3000));
    assert_eq!(rows[1].sold_subscriptions, 0);
    assert_eq!(rows[2].single_visits_count, 1);
    assert_eq!(rows[2].single_visits_income, Money::from_minor(500));
}

//! Cache key registry.
//!
//! Keys are `namespace:qualifier[:qualifier]`. Dates inside keys are always
//! `YYYY-MM-DD`, so two requests for the same calendar days share an entry.

use std::time::Duration;

use crate::domain::foundation::{PersonId, PlanId, SingleVisitId, SubscriptionNumber};
use crate::domain::statistics::DateRange;

/// TTL for whole-table lists.
pub const LIST_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL for single entities and scoped lookups.
pub const ENTITY_TTL: Duration = Duration::from_secs(10 * 60);

/// TTL for every statistic.
pub const STATISTICS_TTL: Duration = Duration::from_secs(10 * 60);

// Person subscriptions

pub const PERSON_SUBS_ALL: &str = "person_subs:all";
pub const PERSON_SUB_PREFIX: &str = "person_sub:";

pub fn person_sub_by_number(number: &SubscriptionNumber) -> String {
    format!("person_sub:number:{}", number)
}

pub fn person_subs_by_name(full_name: &str) -> String {
    format!("person_sub:person:{}", full_name)
}

pub fn person_subs_by_person_id(id: PersonId) -> String {
    format!("person_sub:person_id:{}", id)
}

// Freezes

pub const ACTIVE_FREEZES: &str = "sub_freeze:active";
pub const FREEZE_PREFIX: &str = "sub_freeze:";

// People

pub const PEOPLE_ALL: &str = "people:all";
pub const PEOPLE_PREFIX: &str = "people:";

pub fn people_by_name(query: &str) -> String {
    format!("people:name:{}", query.trim().to_lowercase())
}

pub fn person_by_id(id: PersonId) -> String {
    format!("people:id:{}", id)
}

// Plans

pub const PLANS_ALL: &str = "plans:all";
pub const PLANS_PREFIX: &str = "plans:";

pub fn plan_by_id(id: PlanId) -> String {
    format!("plans:id:{}", id)
}

// Single visits

pub const SINGLE_VISITS_ALL: &str = "single_visits:all";
pub const SINGLE_VISITS_PREFIX: &str = "single_visits:";

pub fn single_visit_by_id(id: SingleVisitId) -> String {
    format!("single_visits:id:{}", id)
}

pub fn single_visits_by_day(day: chrono::NaiveDate) -> String {
    format!("single_visits:day:{}", day.format("%Y-%m-%d"))
}

pub fn single_visits_by_period(range: &DateRange) -> String {
    format!("single_visits:period:{}", range.key_suffix())
}

// Statistics

pub const STAT_TOTAL_CLIENTS: &str = "stat:total_clients";
pub const STAT_TOTAL_INCOME: &str = "stat:total_income";
pub const STAT_TOTAL_SOLD_SUBSCRIPTIONS: &str = "stat:total_sold_subscriptions";
pub const STAT_TOTAL_SINGLE_VISITS: &str = "stat:total_single_visits";
pub const STAT_SINGLE_VISITS_INCOME: &str = "stat:single_visits_income";

pub fn stat_new_clients(range: &DateRange) -> String {
    format!("stat:new_clients:{}", range.key_suffix())
}

pub fn stat_income(range: &DateRange) -> String {
    format!("stat:income:{}", range.key_suffix())
}

pub fn stat_sold_subscriptions(range: &DateRange) -> String {
    format!("stat:sold_subs:{}", range.key_suffix())
}

pub fn stat_single_visits(range: &DateRange) -> String {
    format!("stat:single_visits:{}", range.key_suffix())
}

pub fn stat_monthly(range: &DateRange) -> String {
    format!("stat:monthly_stats:{}", range.key_suffix())
}

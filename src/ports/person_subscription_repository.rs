//! Person-subscription repository port.
//!
//! Write side stores `PersonSubscription` rows keyed by number. Read side
//! returns `PersonSubscriptionView`, the subscription joined with its person
//! and plan plus the freeze days consumed so far.
//!
//! # Ordering
//!
//! Lists are ordered by number: purely numeric numbers first, highest
//! first, then the rest in descending string order.

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, Money, PersonId, PlanId, SubscriptionNumber};
use crate::domain::subscription::{PersonSubscription, SubscriptionStatus};

/// Repository port for person subscriptions.
#[async_trait]
pub trait PersonSubscriptionRepository: Send + Sync {
    /// Stores a new subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionExists` if the number is taken
    /// - `PersonNotFound` if the person does not exist
    /// - `PlanNotFound` if the plan does not exist
    async fn save(&self, subscription: &PersonSubscription) -> Result<(), DomainError>;

    /// Deletes a subscription together with its freeze history.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if no row was deleted
    async fn delete(&self, number: &SubscriptionNumber) -> Result<(), DomainError>;

    /// Overwrites the stored status.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if no row was updated
    async fn update_status(
        &self,
        number: &SubscriptionNumber,
        status: SubscriptionStatus,
    ) -> Result<(), DomainError>;

    async fn find_by_number(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Option<PersonSubscriptionView>, DomainError>;

    async fn list_all(&self) -> Result<Vec<PersonSubscriptionView>, DomainError>;

    /// Subscriptions of the person whose full name equals `full_name`.
    ///
    /// # Errors
    ///
    /// - `PersonNotFound` if no person has that name
    async fn find_by_person_name(
        &self,
        full_name: &str,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError>;

    /// # Errors
    ///
    /// - `PersonNotFound` if the person does not exist
    async fn find_by_person_id(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError>;

    /// Lightweight rows for the daily status refresh.
    async fn list_status_snapshots(&self) -> Result<Vec<StatusSnapshot>, DomainError>;
}

/// Subscription joined with person, plan and freeze usage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSubscriptionView {
    pub number: SubscriptionNumber,
    pub person_id: PersonId,
    pub person_name: String,
    pub subscription_id: PlanId,
    pub subscription_title: String,
    pub subscription_price: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub discount: Money,
    pub final_price: Money,
    /// Freeze quota of the plan.
    pub freeze_days: u32,
    /// Days consumed by all freeze intervals, an open one counted to today.
    pub used_freeze_days: i64,
}

/// What the daily refresh needs to know about one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub number: SubscriptionNumber,
    pub person_id: PersonId,
    pub person_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub has_open_freeze: bool,
}

/// Canonical list order for subscription numbers.
pub fn compare_numbers(a: &SubscriptionNumber, b: &SubscriptionNumber) -> Ordering {
    match (a.numeric_value(), b.numeric_value()) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.as_str().cmp(a.as_str())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.as_str().cmp(a.as_str()),
    }
}

//! Statistics reader port (read side).
//!
//! Aggregate queries over subscriptions and single visits. Subscription
//! figures filter on `start_date`, visit figures on `visit_date`; ranges are
//! inclusive on both ends.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::statistics::{DateRange, MonthlySubscriptionTotals, MonthlyVisitTotals};

/// Reader port for business statistics.
#[async_trait]
pub trait StatisticsReader: Send + Sync {
    /// Number of registered people.
    async fn total_clients(&self) -> Result<i64, DomainError>;

    /// Distinct people with a subscription starting in range.
    async fn new_clients(&self, range: &DateRange) -> Result<i64, DomainError>;

    /// Sum of plan price minus discount over all subscriptions.
    async fn total_income(&self) -> Result<Money, DomainError>;

    /// Sum of plan price minus discount over subscriptions starting in range.
    async fn income(&self, range: &DateRange) -> Result<Money, DomainError>;

    async fn total_sold_subscriptions(&self) -> Result<i64, DomainError>;

    async fn sold_subscriptions(&self, range: &DateRange) -> Result<i64, DomainError>;

    async fn total_single_visits(&self) -> Result<i64, DomainError>;

    async fn single_visits(&self, range: &DateRange) -> Result<i64, DomainError>;

    /// Sum of single-visit sale prices.
    async fn single_visits_income(&self) -> Result<Money, DomainError>;

    /// Per-month subscription totals; months without rows may be omitted.
    async fn monthly_subscription_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlySubscriptionTotals>, DomainError>;

    /// Per-month single-visit totals; months without rows may be omitted.
    async fn monthly_visit_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyVisitTotals>, DomainError>;
}

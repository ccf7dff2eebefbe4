//! Subscription-freeze repository port.
//!
//! Freeze and unfreeze each change two rows: the freeze interval and the
//! subscription status. Implementations perform both in one transaction so
//! that neither half is ever visible alone.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, FreezeId, SubscriptionNumber};
use crate::domain::subscription::SubscriptionFreeze;

/// Repository port for freeze intervals.
#[async_trait]
pub trait FreezeRepository: Send + Sync {
    /// Opens a freeze interval starting on `freeze_start` and marks the
    /// subscription frozen. The decision is made by `FreezePolicy` with
    /// values read under a row lock; `today` bounds an open interval when
    /// counting used days.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the number is unknown
    /// - `FreezeNotSupported`, `FreezeAlreadyOpen`, `InvalidStateTransition`,
    ///   `ValidationFailed` (start outside the validity period),
    ///   `FreezeQuotaExhausted` as decided by the policy
    async fn freeze(
        &self,
        number: &SubscriptionNumber,
        freeze_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError>;

    /// Closes the open interval on `unfreeze_date`, records the days used,
    /// pushes the subscription end date back by the same number of days and
    /// marks the subscription active. Days beyond the plan's remaining quota
    /// are neither recorded nor credited.
    ///
    /// # Errors
    ///
    /// - `FreezeNotFound` if the subscription has no open interval
    /// - `ValidationFailed` if `unfreeze_date` precedes the freeze start
    async fn unfreeze(
        &self,
        number: &SubscriptionNumber,
        unfreeze_date: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError>;

    /// Freeze intervals of subscriptions currently `frozen`, newest first.
    async fn list_active(&self) -> Result<Vec<ActiveFreezeView>, DomainError>;

    /// Full freeze history of one subscription, oldest first.
    async fn list_for_subscription(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Vec<SubscriptionFreeze>, DomainError>;
}

/// A freeze interval of a frozen subscription, with its owner's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFreezeView {
    pub id: FreezeId,
    pub subscription_number: SubscriptionNumber,
    pub person_name: String,
    pub freeze_start: NaiveDate,
    pub freeze_end: Option<NaiveDate>,
    pub days_used: i64,
    pub created_at: DateTime<Utc>,
}

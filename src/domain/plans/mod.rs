//! Subscription plans sold by the gym.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FieldErrors, Money, PlanId};

/// A plan: what a subscription costs, how long it lasts and how many days
/// it may be frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: PlanId,
    pub title: String,
    pub price: Money,
    pub duration_days: u32,
    /// Total freeze days allowed per subscription.
    pub freeze_days: u32,
}

impl SubscriptionPlan {
    pub fn supports_freezing(&self) -> bool {
        self.freeze_days > 0
    }
}

/// Editable plan fields, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDetails {
    pub title: String,
    pub price: Money,
    pub duration_days: u32,
    pub freeze_days: u32,
}

impl PlanDetails {
    pub const MAX_DURATION_DAYS: i64 = 3650;
    pub const MAX_FREEZE_DAYS: i64 = 365;

    /// # Errors
    ///
    /// Reports a blank title, a negative price, a duration outside
    /// `1..=3650` and freeze days outside `0..=365`.
    pub fn new(
        title: &str,
        price: i64,
        duration_days: i64,
        freeze_days: i64,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = title.trim();
        if title.is_empty() {
            errors.add("title", "title is required");
        }
        if price < 0 {
            errors.add("price", "price must not be negative");
        }
        if !(1..=Self::MAX_DURATION_DAYS).contains(&duration_days) {
            errors.add("duration_days", "duration_days must be between 1 and 3650");
        }
        if !(0..=Self::MAX_FREEZE_DAYS).contains(&freeze_days) {
            errors.add("freeze_days", "freeze_days must be between 0 and 365");
        }
        errors.into_result()?;

        Ok(Self {
            title: title.to_string(),
            price: Money::from_minor(price),
            duration_days: duration_days as u32,
            freeze_days: freeze_days as u32,
        })
    }

    pub fn into_plan(self, id: PlanId) -> SubscriptionPlan {
        SubscriptionPlan {
            id,
            title: self.title,
            price: self.price,
            duration_days: self.duration_days,
            freeze_days: self.freeze_days,
        }
    }
}

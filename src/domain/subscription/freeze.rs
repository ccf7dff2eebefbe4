//! Freeze intervals and the per-plan freeze quota.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    days_between, DomainError, ErrorCode, FreezeId, SubscriptionNumber,
};

use super::SubscriptionStatus;

/// A span during which a subscription's validity is suspended.
///
/// `freeze_end == None` marks the interval as open. At most one interval per
/// subscription is open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionFreeze {
    pub id: FreezeId,
    pub subscription_number: SubscriptionNumber,
    pub freeze_start: NaiveDate,
    pub freeze_end: Option<NaiveDate>,
    /// Recorded when the interval is closed; zero while open.
    pub days_used: i64,
    pub created_at: DateTime<Utc>,
}

impl SubscriptionFreeze {
    pub fn is_open(&self) -> bool {
        self.freeze_end.is_none()
    }

    /// Days this interval consumes from the quota: the recorded days once
    /// closed, the span up to `today` while open.
    pub fn days_counted(&self, today: NaiveDate) -> i64 {
        match self.freeze_end {
            Some(_) => self.days_used,
            None => days_between(self.freeze_start, today).max(0),
        }
    }

    /// Days to record when closing the interval on `unfreeze_date`.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the date precedes the freeze start.
    pub fn days_until(&self, unfreeze_date: NaiveDate) -> Result<i64, DomainError> {
        if unfreeze_date < self.freeze_start {
            return Err(DomainError::validation(
                "unfreeze_date",
                "unfreeze_date must not precede freeze_start",
            ));
        }
        Ok(days_between(self.freeze_start, unfreeze_date))
    }

    /// Days to record, and to add to the subscription's end date, when
    /// closing on `unfreeze_date`. Never more than what is left of
    /// `quota_days` after the `used_before` days of earlier intervals.
    ///
    /// # Errors
    ///
    /// `ValidationFailed` when the date precedes the freeze start.
    pub fn days_to_record(
        &self,
        unfreeze_date: NaiveDate,
        quota_days: u32,
        used_before: i64,
    ) -> Result<i64, DomainError> {
        let remaining = (i64::from(quota_days) - used_before).max(0);
        Ok(self.days_until(unfreeze_date)?.min(remaining))
    }
}

/// Total quota consumption across all intervals of one subscription.
pub fn used_freeze_days(freezes: &[SubscriptionFreeze], today: NaiveDate) -> i64 {
    freezes.iter().map(|f| f.days_counted(today)).sum()
}

/// Decides whether a subscription may be frozen right now.
///
/// Storage adapters call this inside the freeze transaction with values read
/// under lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePolicy {
    /// Freeze days the plan allows in total.
    pub quota_days: u32,
    /// Days already consumed, including an open interval.
    pub used_days: i64,
    pub status: SubscriptionStatus,
    pub has_open_freeze: bool,
    /// Validity period of the subscription.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl FreezePolicy {
    /// Checks a freeze starting on `freeze_start`. A start in the past
    /// consumes the days up to `today` right away.
    ///
    /// # Errors
    ///
    /// - `FreezeNotSupported` when the plan allows no freeze days
    /// - `FreezeAlreadyOpen` when an interval is already open
    /// - `InvalidStateTransition` when the subscription is not active
    /// - `ValidationFailed` when `freeze_start` lies outside the validity period
    /// - `FreezeQuotaExhausted` when the quota is used up
    pub fn check(
        &self,
        number: &SubscriptionNumber,
        freeze_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), DomainError> {
        if self.quota_days == 0 {
            return Err(DomainError::new(
                ErrorCode::FreezeNotSupported,
                "this plan does not support freezing",
            )
            .with_detail("number", number.as_str()));
        }
        if self.has_open_freeze {
            return Err(DomainError::new(
                ErrorCode::FreezeAlreadyOpen,
                "subscription already has an open freeze",
            )
            .with_detail("number", number.as_str()));
        }
        if self.status != SubscriptionStatus::Active {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("cannot freeze a subscription in {} state", self.status),
            )
            .with_detail("number", number.as_str())
            .with_detail("status", self.status.as_str()));
        }
        if freeze_start < self.start_date || freeze_start > self.end_date {
            return Err(DomainError::validation(
                "freeze_start",
                format!(
                    "freeze_start must fall between {} and {}",
                    self.start_date, self.end_date
                ),
            ));
        }
        let used = self.used_days + days_between(freeze_start, today).max(0);
        if used >= i64::from(self.quota_days) {
            return Err(DomainError::new(
                ErrorCode::FreezeQuotaExhausted,
                format!(
                    "freeze quota of {} days is used up ({} used)",
                    self.quota_days, used
                ),
            )
            .with_detail("number", number.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn number() -> SubscriptionNumber {
        SubscriptionNumber::new("1001").unwrap()
    }

    fn freeze(start: NaiveDate, end: Option<NaiveDate>) -> SubscriptionFreeze {
        SubscriptionFreeze {
            id: FreezeId::new(1).unwrap(),
            subscription_number: number(),
            freeze_start: start,
            freeze_end: end,
            days_used: end.map(|e| days_between(start, e)).unwrap_or(0),
            created_at: Utc::now(),
        }
    }

    fn today() -> NaiveDate {
        date(2024, 5, 10)
    }

    fn policy() -> FreezePolicy {
        FreezePolicy {
            quota_days: 5,
            used_days: 0,
            status: SubscriptionStatus::Active,
            has_open_freeze: false,
            start_date: date(2024, 5, 1),
            end_date: date(2024, 5, 31),
        }
    }

    fn check(policy: FreezePolicy, freeze_start: NaiveDate) -> Result<(), DomainError> {
        policy.check(&number(), freeze_start, today())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Day accounting
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn open_interval_counts_up_to_today() {
        let f = freeze(date(2024, 5, 1), None);
        assert!(f.is_open());
        assert_eq!(f.days_counted(date(2024, 5, 4)), 3);
    }

    #[test]
    fn closed_interval_counts_recorded_days() {
        let mut f = freeze(date(2024, 5, 1), Some(date(2024, 5, 9)));
        f.days_used = 3;
        assert_eq!(f.days_counted(date(2024, 9, 1)), 3);
    }

    #[test]
    fn used_days_sum_all_intervals() {
        let freezes = vec![
            freeze(date(2024, 3, 1), Some(date(2024, 3, 3))),
            freeze(date(2024, 5, 1), None),
        ];
        assert_eq!(used_freeze_days(&freezes, date(2024, 5, 2)), 3);
    }

    #[test]
    fn unfreeze_before_start_is_rejected() {
        let f = freeze(date(2024, 5, 10), None);
        assert!(f.days_until(date(2024, 5, 9)).is_err());
        assert_eq!(f.days_until(date(2024, 5, 10)).unwrap(), 0);
        assert_eq!(f.days_until(date(2024, 5, 14)).unwrap(), 4);
    }

    #[test]
    fn recorded_days_stop_at_the_quota_left() {
        let f = freeze(date(2024, 3, 1), None);

        assert_eq!(f.days_to_record(date(2024, 3, 31), 3, 0).unwrap(), 3);
        assert_eq!(f.days_to_record(date(2024, 3, 31), 10, 8).unwrap(), 2);
        assert_eq!(f.days_to_record(date(2024, 3, 3), 10, 0).unwrap(), 2);
        assert_eq!(f.days_to_record(date(2024, 3, 31), 3, 5).unwrap(), 0);
        assert!(f.days_to_record(date(2024, 2, 28), 3, 0).is_err());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Freeze policy
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn plan_without_freeze_days_is_rejected_first() {
        let err = check(
            FreezePolicy {
                quota_days: 0,
                status: SubscriptionStatus::Expired,
                ..policy()
            },
            today(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeNotSupported);
        assert_eq!(err.message, "this plan does not support freezing");
    }

    #[test]
    fn second_open_freeze_is_rejected() {
        let err = check(
            FreezePolicy {
                has_open_freeze: true,
                status: SubscriptionStatus::Frozen,
                ..policy()
            },
            today(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeAlreadyOpen);
    }

    #[test]
    fn only_active_subscriptions_can_be_frozen() {
        for status in [
            SubscriptionStatus::Frozen,
            SubscriptionStatus::Expired,
            SubscriptionStatus::Closed,
        ] {
            let err = check(FreezePolicy { status, ..policy() }, today()).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidStateTransition);
        }
    }

    #[test]
    fn exhausted_quota_is_rejected() {
        let err = check(
            FreezePolicy {
                used_days: 5,
                ..policy()
            },
            today(),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeQuotaExhausted);
        assert!(check(
            FreezePolicy {
                used_days: 4,
                ..policy()
            },
            today()
        )
        .is_ok());
    }

    #[test]
    fn freeze_start_outside_validity_period_is_rejected() {
        for start in [date(2024, 4, 30), date(2024, 6, 1), date(2024, 1, 1)] {
            let err = check(policy(), start).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationFailed);
            assert_eq!(err.details.get("field").map(String::as_str), Some("freeze_start"));
        }
        assert!(check(policy(), date(2024, 5, 31)).is_ok());
    }

    #[test]
    fn backdated_start_counts_against_the_quota() {
        assert!(check(policy(), date(2024, 5, 6)).is_ok());

        let err = check(policy(), date(2024, 5, 5)).unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeQuotaExhausted);

        let err = check(
            FreezePolicy {
                used_days: 2,
                ..policy()
            },
            date(2024, 5, 7),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FreezeQuotaExhausted);
    }
}

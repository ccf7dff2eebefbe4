//! SubscriptionStatus state machine and the daily date rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{StateMachine, ValidationError};

/// Status of a person subscription.
///
/// `Active`, `Frozen` and `Expired` move between each other as the calendar
/// advances or when a freeze is opened or closed. `Closed` is set only by an
/// administrator and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Frozen,
    Expired,
    Closed,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 4] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Frozen,
        SubscriptionStatus::Expired,
        SubscriptionStatus::Closed,
    ];

    /// Storage and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Frozen => "frozen",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Closed => "closed",
        }
    }

    /// Status implied by the calendar alone.
    ///
    /// A subscription that has not started yet counts as frozen, one whose
    /// last day has passed is expired, anything else is active. `today` is a
    /// calendar date, so the start and end days themselves are active.
    pub fn scheduled_for(start_date: NaiveDate, end_date: NaiveDate, today: NaiveDate) -> Self {
        if start_date > today {
            SubscriptionStatus::Frozen
        } else if end_date < today {
            SubscriptionStatus::Expired
        } else {
            SubscriptionStatus::Active
        }
    }

    /// Status the daily refresh should store for a subscription.
    ///
    /// Closed subscriptions stay closed and an open freeze interval keeps the
    /// subscription frozen; otherwise the calendar decides.
    pub fn refreshed(
        current: SubscriptionStatus,
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
        has_open_freeze: bool,
    ) -> Self {
        if current == SubscriptionStatus::Closed {
            return SubscriptionStatus::Closed;
        }
        if has_open_freeze {
            return SubscriptionStatus::Frozen;
        }
        Self::scheduled_for(start_date, end_date, today)
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            (Active, Frozen)
                | (Active, Expired)
                | (Active, Closed)
                | (Frozen, Active)
                | (Frozen, Expired)
                | (Frozen, Closed)
                | (Expired, Active)
                | (Expired, Frozen)
                | (Expired, Closed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![Frozen, Expired, Closed],
            Frozen => vec![Active, Expired, Closed],
            Expired => vec![Active, Frozen, Closed],
            Closed => vec![],
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "frozen" => Ok(SubscriptionStatus::Frozen),
            "expired" => Ok(SubscriptionStatus::Expired),
            "closed" => Ok(SubscriptionStatus::Closed),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

//! Strongly-typed identifier value objects.
//!
//! Surrogate keys are positive integers assigned by storage. The subscription
//! number is the human-assigned business key printed on the member's card.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

macro_rules! serial_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a storage-assigned key. Keys start at 1.
            pub fn new(value: i64) -> Result<Self, ValidationError> {
                if value <= 0 {
                    return Err(ValidationError::out_of_range($field, 1, i64::MAX, value));
                }
                Ok(Self(value))
            }

            /// Returns the raw key.
            pub fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = s
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| ValidationError::invalid_format($field, "expected a positive integer"))?;
                Self::new(value)
            }
        }
    };
}

serial_id!(
    /// Identifier of a gym member.
    PersonId,
    "person_id"
);

serial_id!(
    /// Identifier of a subscription plan.
    PlanId,
    "subscription_id"
);

serial_id!(
    /// Identifier of a freeze interval.
    FreezeId,
    "freeze_id"
);

serial_id!(
    /// Identifier of a single-visit sale.
    SingleVisitId,
    "single_visit_id"
);

serial_id!(
    /// Identifier of an SSO user.
    UserId,
    "user_id"
);

/// Business key of a person subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionNumber(String);

impl SubscriptionNumber {
    pub const MAX_LEN: usize = 64;

    /// Creates a subscription number, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("number"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::out_of_range(
                "number",
                1,
                Self::MAX_LEN as i64,
                trimmed.len() as i64,
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value when the number consists only of digits.
    pub fn numeric_value(&self) -> Option<u64> {
        if self.0.bytes().all(|b| b.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }
}

impl fmt::Display for SubscriptionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_id_rejects_zero_and_negative() {
        assert!(PersonId::new(0).is_err());
        assert!(PlanId::new(-5).is_err());
        assert_eq!(PersonId::new(7).unwrap().as_i64(), 7);
    }

    #[test]
    fn serial_id_parses_from_path_segment() {
        let id: SingleVisitId = "42".parse().unwrap();
        assert_eq!(id.as_i64(), 42);
        assert!("abc".parse::<SingleVisitId>().is_err());
    }

    #[test]
    fn serial_id_error_names_the_field() {
        let err = PlanId::new(0).unwrap_err();
        assert_eq!(err.field(), "subscription_id");
    }

    #[test]
    fn subscription_number_is_trimmed() {
        let number = SubscriptionNumber::new("  1001 ").unwrap();
        assert_eq!(number.as_str(), "1001");
    }

    #[test]
    fn blank_subscription_number_is_rejected() {
        assert_eq!(
            SubscriptionNumber::new("   ").unwrap_err(),
            ValidationError::empty_field("number")
        );
    }

    #[test]
    fn overlong_subscription_number_is_rejected() {
        assert!(SubscriptionNumber::new("9".repeat(65)).is_err());
    }

    #[test]
    fn numeric_value_only_for_digit_numbers() {
        assert_eq!(SubscriptionNumber::new("0042").unwrap().numeric_value(), Some(42));
        assert_eq!(SubscriptionNumber::new("A-12").unwrap().numeric_value(), None);
    }
}

//! One-off single-visit sales.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{parse_date, FieldErrors, Money, SingleVisitId};

/// A single paid visit, independent of any subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleVisit {
    pub id: SingleVisitId,
    pub visit_date: NaiveDate,
    pub final_price: Money,
}

/// Validated input for recording a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleVisitDetails {
    pub visit_date: NaiveDate,
    pub final_price: Money,
}

impl SingleVisitDetails {
    /// # Errors
    ///
    /// Reports a missing or malformed `visit_date` and a negative price.
    pub fn new(visit_date: Option<&str>, final_price: i64) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let visit_date = match visit_date {
            None => {
                errors.add("visit_date", "visit_date is required");
                None
            }
            Some(raw) => parse_date("visit_date", raw)
                .map_err(|e| errors.add_error(&e))
                .ok(),
        };
        if final_price < 0 {
            errors.add("final_price", "final_price must not be negative");
        }
        errors.into_result()?;

        match visit_date {
            Some(visit_date) => Ok(Self {
                visit_date,
                final_price: Money::from_minor(final_price),
            }),
            None => {
                let mut errors = FieldErrors::new();
                errors.add("visit_date", "visit_date is required");
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_date() {
        let details = SingleVisitDetails::new(Some("2024-05-10"), 300).unwrap();
        assert_eq!(details.visit_date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert_eq!(details.final_price, Money::from_minor(300));
    }

    #[test]
    fn requires_visit_date() {
        let errors = SingleVisitDetails::new(None, 300).unwrap_err();
        assert_eq!(errors.get("visit_date"), Some("visit_date is required"));
    }

    #[test]
    fn reports_bad_date_and_price_together() {
        let errors = SingleVisitDetails::new(Some("10.05.2024"), -1).unwrap_err();
        assert!(errors.contains("visit_date"));
        assert!(errors.contains("final_price"));
    }
}

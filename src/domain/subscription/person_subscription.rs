//! PersonSubscription entity and the rules for opening one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    add_days, parse_optional_date, FieldErrors, Money, PersonId, PlanId, SubscriptionNumber,
};
use crate::domain::plans::SubscriptionPlan;

use super::SubscriptionStatus;

/// A plan sold to a person, identified by its card number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSubscription {
    pub number: SubscriptionNumber,
    pub person_id: PersonId,
    pub plan_id: PlanId,
    /// Plan price at the moment of sale.
    pub subscription_price: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub discount: Money,
    pub final_price: Money,
}

/// Raw input for selling a subscription, as received from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonSubscriptionDraft {
    pub number: String,
    pub person_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub discount: Option<i64>,
    pub final_price: Option<i64>,
    pub subscription_price: Option<i64>,
}

/// Draft whose fields passed validation; the plan is still to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub number: SubscriptionNumber,
    pub person_id: PersonId,
    pub plan_id: PlanId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub discount: Money,
    pub final_price: Option<Money>,
    pub subscription_price: Option<Money>,
}

impl PersonSubscriptionDraft {
    /// Checks every field that does not depend on the plan.
    ///
    /// # Errors
    ///
    /// Returns all offending fields at once.
    pub fn validate(&self) -> Result<ValidatedDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let number = SubscriptionNumber::new(self.number.as_str())
            .map_err(|e| errors.add_error(&e))
            .ok();

        let person_id = match self.person_id {
            None => {
                errors.add("person_id", "person_id is required");
                None
            }
            Some(raw) => PersonId::new(raw).map_err(|e| errors.add_error(&e)).ok(),
        };

        let plan_id = match self.subscription_id {
            None => {
                errors.add("subscription_id", "subscription_id is required");
                None
            }
            Some(raw) => PlanId::new(raw).map_err(|e| errors.add_error(&e)).ok(),
        };

        let start_date = parse_optional_date("start_date", self.start_date.as_deref())
            .map_err(|e| errors.add_error(&e))
            .ok()
            .flatten();
        let end_date = parse_optional_date("end_date", self.end_date.as_deref())
            .map_err(|e| errors.add_error(&e))
            .ok()
            .flatten();
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "end_date must not precede start_date");
            }
        }

        let discount = Money::from_minor(self.discount.unwrap_or(0));
        if discount.is_negative() {
            errors.add("discount", "discount must not be negative");
        }
        let final_price = self.final_price.map(Money::from_minor);
        if final_price.is_some_and(|p| p.is_negative()) {
            errors.add("final_price", "final_price must not be negative");
        }
        let subscription_price = self.subscription_price.map(Money::from_minor);
        if subscription_price.is_some_and(|p| p.is_negative()) {
            errors.add("subscription_price", "subscription_price must not be negative");
        }

        errors.into_result()?;

        match (number, person_id, plan_id) {
            (Some(number), Some(person_id), Some(plan_id)) => Ok(ValidatedDraft {
                number,
                person_id,
                plan_id,
                start_date,
                end_date,
                discount,
                final_price,
                subscription_price,
            }),
            _ => {
                let mut errors = FieldErrors::new();
                errors.add("number", "invalid subscription input");
                Err(errors)
            }
        }
    }
}

impl ValidatedDraft {
    /// Fills defaults from the plan and the current date.
    ///
    /// - `start_date` defaults to `today`
    /// - `end_date` defaults to `start_date` plus the plan duration
    /// - the price snapshot defaults to the plan price
    /// - the sale price defaults to snapshot minus discount, floored at zero
    ///
    /// The initial status follows the calendar.
    pub fn into_subscription(
        self,
        plan: &SubscriptionPlan,
        today: NaiveDate,
    ) -> Result<PersonSubscription, FieldErrors> {
        let mut errors = FieldErrors::new();

        let start_date = self.start_date.unwrap_or(today);
        let end_date = match self.end_date {
            Some(end) => end,
            None => match add_days(start_date, i64::from(plan.duration_days)) {
                Some(end) => end,
                None => {
                    errors.add("start_date", "start_date is out of range");
                    start_date
                }
            },
        };
        if end_date < start_date {
            errors.add("end_date", "end_date must not precede start_date");
        }
        errors.into_result()?;

        let subscription_price = self.subscription_price.unwrap_or(plan.price);
        let final_price = self
            .final_price
            .unwrap_or_else(|| subscription_price.saturating_sub_floor_zero(self.discount));

        Ok(PersonSubscription {
            number: self.number,
            person_id: self.person_id,
            plan_id: self.plan_id,
            subscription_price,
            start_date,
            end_date,
            status: SubscriptionStatus::scheduled_for(start_date, end_date, today),
            discount: self.discount,
            final_price,
        })
    }
}

//! Foundation module - Shared domain primitives.
//!
//! Identifiers, money, calendar helpers, the status state machine trait and
//! the error vocabulary used across the gym domain.

mod auth;
mod calendar;
mod errors;
mod ids;
mod money;
mod state_machine;

pub use auth::{AuthError, AuthenticatedUser};
pub use calendar::{
    add_days, days_between, format_date, parse_date, parse_optional_date, DATE_FORMAT,
};
pub use errors::{DomainError, ErrorCode, FieldErrors, ValidationError};
pub use ids::{FreezeId, PersonId, PlanId, SingleVisitId, SubscriptionNumber, UserId};
pub use money::Money;
pub use state_machine::StateMachine;

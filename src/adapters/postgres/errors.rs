//! Translation of sqlx errors into domain sentinels.

use crate::domain::foundation::{
    DomainError, ErrorCode, PersonId, PlanId, SubscriptionNumber,
};
use crate::domain::subscription::SubscriptionStatus;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Name of the violated constraint and its SQLSTATE, if `err` is a
/// constraint violation.
pub(super) fn violated_constraint(err: &sqlx::Error) -> Option<(String, String)> {
    match err {
        sqlx::Error::Database(db) => {
            let code = db.code()?.to_string();
            let constraint = db.constraint().unwrap_or_default().to_string();
            Some((code, constraint))
        }
        _ => None,
    }
}

pub(super) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(violated_constraint(err), Some((code, name)) if code == UNIQUE_VIOLATION && name == constraint)
}

pub(super) fn is_foreign_key_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(violated_constraint(err), Some((code, name)) if code == FOREIGN_KEY_VIOLATION && name == constraint)
}

pub(super) fn is_check_violation(err: &sqlx::Error) -> bool {
    matches!(violated_constraint(err), Some((code, _)) if code == CHECK_VIOLATION)
}

/// Generic database failure with context.
pub(super) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", context, err))
}

pub(super) fn person_not_found(person: impl ToString) -> DomainError {
    let person = person.to_string();
    DomainError::new(ErrorCode::PersonNotFound, format!("person {} not found", person))
        .with_detail("person", person)
}

pub(super) fn plan_not_found(id: PlanId) -> DomainError {
    DomainError::new(ErrorCode::PlanNotFound, format!("plan {} not found", id))
        .with_detail("plan", id.to_string())
}

pub(super) fn subscription_not_found(number: &SubscriptionNumber) -> DomainError {
    DomainError::new(
        ErrorCode::SubscriptionNotFound,
        format!("subscription {} not found", number),
    )
    .with_detail("number", number.as_str())
}

pub(super) fn person_in_use(id: PersonId) -> DomainError {
    DomainError::new(
        ErrorCode::PersonInUse,
        format!("person {} still has subscriptions", id),
    )
    .with_detail("person", id.to_string())
}

/// Rebuilds a stored value object, treating a bad value as corrupt data.
pub(super) fn corrupt<T, E: std::fmt::Display>(
    column: &str,
    value: Result<T, E>,
) -> Result<T, DomainError> {
    value.map_err(|e| DomainError::database(format!("corrupt {} column: {}", column, e)))
}

pub(super) fn parse_status(value: &str) -> Result<SubscriptionStatus, DomainError> {
    corrupt("status", value.parse::<SubscriptionStatus>())
}

/// Day counts are stored as INTEGER.
pub(super) fn to_int4(field: &str, value: u32) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| DomainError::validation(field, "value is too large"))
}

pub(super) fn from_int4(column: &str, value: i32) -> Result<u32, DomainError> {
    corrupt(column, u32::try_from(value))
}

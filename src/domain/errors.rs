//! Public error taxonomy of the gym services.
//!
//! Storage and cache adapters report `DomainError` sentinels; handlers turn
//! them into `GymError` once, through `From<DomainError>`. Callers only ever
//! see the four kinds below.
//!
//! # HTTP Status Mapping
//!
//! | Kind | Errors | HTTP Status |
//! |------|--------|-------------|
//! | Validation | ValidationFailed, FreezeNotSupported, FreezeQuotaExhausted | 400 |
//! | NotFound | PersonNotFound, PlanNotFound, SubscriptionNotFound, FreezeNotFound, SingleVisitNotFound | 404 |
//! | Conflict | PersonExists, SubscriptionExists, FreezeAlreadyOpen, PersonInUse, PlanInUse, InvalidState | 409 |
//! | Internal | Infrastructure | 500 |

use std::fmt;

use crate::domain::foundation::{DomainError, ErrorCode, FieldErrors, ValidationError};

/// Coarse classification used by transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

/// Errors returned by application handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GymError {
    /// One or more input fields are missing or malformed.
    ValidationFailed { fields: FieldErrors },

    /// The plan allows zero freeze days.
    FreezeNotSupported(String),

    /// The plan's freeze days are used up.
    FreezeQuotaExhausted { number: String, reason: String },

    PersonNotFound(String),
    PlanNotFound(String),
    SubscriptionNotFound(String),

    /// No open freeze interval exists for the subscription.
    FreezeNotFound(String),

    SingleVisitNotFound(String),

    /// Phone number already registered.
    PersonExists(String),

    /// Subscription number already taken.
    SubscriptionExists(String),

    /// The subscription already has an open freeze interval.
    FreezeAlreadyOpen(String),

    /// The person still owns subscriptions.
    PersonInUse(String),

    /// Subscriptions still reference the plan.
    PlanInUse(String),

    /// The subscription's status does not allow the operation.
    InvalidState { number: String, reason: String },

    /// Storage failure that fits no other category.
    Infrastructure(String),
}

impl GymError {
    /// Creates a validation error for a single field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.add(field, message);
        GymError::ValidationFailed { fields }
    }

    /// Creates an infrastructure error.
    pub fn infrastructure(message: impl Into<String>) -> Self {
        GymError::Infrastructure(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GymError::ValidationFailed { .. }
            | GymError::FreezeNotSupported(_)
            | GymError::FreezeQuotaExhausted { .. } => ErrorKind::Validation,
            GymError::PersonNotFound(_)
            | GymError::PlanNotFound(_)
            | GymError::SubscriptionNotFound(_)
            | GymError::FreezeNotFound(_)
            | GymError::SingleVisitNotFound(_) => ErrorKind::NotFound,
            GymError::PersonExists(_)
            | GymError::SubscriptionExists(_)
            | GymError::FreezeAlreadyOpen(_)
            | GymError::PersonInUse(_)
            | GymError::PlanInUse(_)
            | GymError::InvalidState { .. } => ErrorKind::Conflict,
            GymError::Infrastructure(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            GymError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            GymError::FreezeNotSupported(_) => ErrorCode::FreezeNotSupported,
            GymError::FreezeQuotaExhausted { .. } => ErrorCode::FreezeQuotaExhausted,
            GymError::PersonNotFound(_) => ErrorCode::PersonNotFound,
            GymError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            GymError::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            GymError::FreezeNotFound(_) => ErrorCode::FreezeNotFound,
            GymError::SingleVisitNotFound(_) => ErrorCode::SingleVisitNotFound,
            GymError::PersonExists(_) => ErrorCode::PersonExists,
            GymError::SubscriptionExists(_) => ErrorCode::SubscriptionExists,
            GymError::FreezeAlreadyOpen(_) => ErrorCode::FreezeAlreadyOpen,
            GymError::PersonInUse(_) => ErrorCode::PersonInUse,
            GymError::PlanInUse(_) => ErrorCode::PlanInUse,
            GymError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            GymError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            GymError::ValidationFailed { fields } => format!("Validation failed: {}", fields),
            GymError::FreezeNotSupported(number) => {
                format!("Subscription {}: this plan does not support freezing", number)
            }
            GymError::FreezeQuotaExhausted { number, reason } => {
                format!("Subscription {}: {}", number, reason)
            }
            GymError::PersonNotFound(who) => format!("Person not found: {}", who),
            GymError::PlanNotFound(id) => format!("Subscription plan not found: {}", id),
            GymError::SubscriptionNotFound(number) => {
                format!("Subscription not found: {}", number)
            }
            GymError::FreezeNotFound(number) => {
                format!("No open freeze for subscription {}", number)
            }
            GymError::SingleVisitNotFound(id) => format!("Single visit not found: {}", id),
            GymError::PersonExists(phone) => {
                format!("A person with phone {} already exists", phone)
            }
            GymError::SubscriptionExists(number) => {
                format!("Subscription {} already exists", number)
            }
            GymError::FreezeAlreadyOpen(number) => {
                format!("Subscription {} is already frozen", number)
            }
            GymError::PersonInUse(id) => format!("Person {} still has subscriptions", id),
            GymError::PlanInUse(id) => {
                format!("Subscription plan {} is still in use", id)
            }
            GymError::InvalidState { number, reason } => {
                format!("Subscription {}: {}", number, reason)
            }
            GymError::Infrastructure(_) => "An internal error occurred".to_string(),
        }
    }

    /// Offending fields for validation errors.
    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            GymError::ValidationFailed { fields } => Some(fields),
            _ => None,
        }
    }
}

impl fmt::Display for GymError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GymError::Infrastructure(detail) => write!(f, "Infrastructure error: {}", detail),
            other => f.write_str(&other.message()),
        }
    }
}

impl std::error::Error for GymError {}

impl From<FieldErrors> for GymError {
    fn from(fields: FieldErrors) -> Self {
        GymError::ValidationFailed { fields }
    }
}

impl From<ValidationError> for GymError {
    fn from(err: ValidationError) -> Self {
        let mut fields = FieldErrors::new();
        fields.add_error(&err);
        GymError::ValidationFailed { fields }
    }
}

/// Translates storage sentinels. Details keyed `number`, `person`, `plan`,
/// `phone` and `id` supply the subject of the message.
impl From<DomainError> for GymError {
    fn from(err: DomainError) -> Self {
        let subject = |key: &str| err.detail(key).unwrap_or_default().to_string();
        match err.code {
            ErrorCode::ValidationFailed => {
                let field = err.detail("field").unwrap_or("input").to_string();
                GymError::validation(field, err.message.clone())
            }
            ErrorCode::FreezeNotSupported => GymError::FreezeNotSupported(subject("number")),
            ErrorCode::FreezeQuotaExhausted => GymError::FreezeQuotaExhausted {
                number: subject("number"),
                reason: err.message.clone(),
            },
            ErrorCode::PersonNotFound => GymError::PersonNotFound(subject("person")),
            ErrorCode::PlanNotFound => GymError::PlanNotFound(subject("plan")),
            ErrorCode::SubscriptionNotFound => GymError::SubscriptionNotFound(subject("number")),
            ErrorCode::FreezeNotFound => GymError::FreezeNotFound(subject("number")),
            ErrorCode::SingleVisitNotFound => GymError::SingleVisitNotFound(subject("id")),
            ErrorCode::PersonExists => GymError::PersonExists(subject("phone")),
            ErrorCode::SubscriptionExists => GymError::SubscriptionExists(subject("number")),
            ErrorCode::FreezeAlreadyOpen => GymError::FreezeAlreadyOpen(subject("number")),
            ErrorCode::PersonInUse => GymError::PersonInUse(subject("person")),
            ErrorCode::PlanInUse => GymError::PlanInUse(subject("plan")),
            ErrorCode::InvalidStateTransition => GymError::InvalidState {
                number: subject("number"),
                reason: err.message.clone(),
            },
            ErrorCode::Unauthorized
            | ErrorCode::Forbidden
            | ErrorCode::DatabaseError
            | ErrorCode::CacheError
            | ErrorCode::InternalError => GymError::Infrastructure(err.to_string()),
        }
    }
}

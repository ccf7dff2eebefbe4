//! Authentication types for the domain layer.
//!
//! The SSO service owns users, passwords and tokens. The gym backend only
//! learns who is calling and which roles they hold; these types carry that
//! answer from the `IdentityProvider` port into request handlers.

use super::UserId;
use thiserror::Error;

/// Caller identity established from a validated SSO token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// SSO user id.
    pub id: UserId,

    /// Email from the token claims; empty when the SSO service omits it.
    pub email: String,

    /// Role names granted for this application.
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            id,
            email: email.into(),
            roles,
        }
    }

    /// Case-insensitive role check.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

/// Authentication errors that can occur during token checks, login and
/// registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The token is missing, malformed, expired or revoked.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Login rejected by the SSO service.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration rejected because the email is taken.
    #[error("User already exists")]
    UserExists,

    /// The SSO service rejected the request payload.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Token is valid but the caller lacks the role required for this action.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The SSO service is unreachable or failed internally.
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    /// Creates a service unavailable error with a message.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if this is a transient error that may succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::ServiceUnavailable(_))
    }
}

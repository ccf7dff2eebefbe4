//! Identity provider port for the external SSO service.
//!
//! The SSO service owns accounts and issues tokens. This backend uses it for
//! three things: logging a user in, registering a user, and checking a token
//! presented with a request. The application id under which tokens are
//! issued is adapter configuration.
//!
//! # Example Implementation
//!
//! ```ignore
//! pub struct GrpcIdentityProvider { ... }
//!
//! #[async_trait]
//! impl IdentityProvider for GrpcIdentityProvider {
//!     async fn check_token(&self, token: &str) -> Result<TokenCheck, AuthError> {
//!         // CheckToken(app_id, token) -> { user_id, email, roles, is_valid }
//!     }
//!     // ...
//! }
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};

/// Port for the SSO service.
///
/// # Contract
///
/// - `AuthError::InvalidCredentials` for a rejected login
/// - `AuthError::UserExists` for a duplicate registration
/// - `AuthError::InvalidRequest` for payloads the SSO service refuses
/// - `AuthError::ServiceUnavailable` for transport and internal failures
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges credentials for a token.
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Creates an account and returns its user id.
    async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError>;

    /// Checks a token. A well-formed but rejected token yields
    /// `TokenCheck { valid: false, .. }` or `AuthError::InvalidToken`.
    async fn check_token(&self, token: &str) -> Result<TokenCheck, AuthError>;
}

/// Answer of the SSO token check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenCheck {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
    pub valid: bool,
}

impl TokenCheck {
    /// The caller identity, if the token was accepted.
    pub fn into_user(self) -> Result<AuthenticatedUser, AuthError> {
        if !self.valid {
            return Err(AuthError::InvalidToken);
        }
        Ok(AuthenticatedUser::new(self.user_id, self.email, self.roles))
    }
}

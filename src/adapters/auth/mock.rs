//! Mock identity provider for testing.
//!
//! Implements `IdentityProvider` without an SSO service: accounts and tokens
//! live in maps, and a forced error can stand in for an outage.
//!
//! # Example
//!
//! ```ignore
//! use gym_membership::adapters::auth::MockIdentityProvider;
//!
//! let provider = MockIdentityProvider::new()
//!     .with_token("admin-token", 1, &["admin"])
//!     .with_token("staff-token", 2, &[]);
//!
//! let check = provider.check_token("admin-token").await?;
//! assert!(check.roles.contains(&"admin".to_string()));
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId};
use crate::ports::{IdentityProvider, TokenCheck};

#[derive(Debug, Clone)]
struct Account {
    user_id: UserId,
    password: String,
    roles: Vec<String>,
}

#[derive(Debug, Default)]
struct State {
    tokens: HashMap<String, TokenCheck>,
    accounts: HashMap<String, Account>,
    last_user_id: i64,
}

/// In-memory `IdentityProvider`.
///
/// Unknown tokens yield `InvalidToken`. A successful login issues the token
/// `token-{email}`.
#[derive(Debug, Default)]
pub struct MockIdentityProvider {
    state: RwLock<State>,
    force_error: RwLock<Option<AuthError>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` for the given user and roles.
    pub fn with_token(self, token: impl Into<String>, user_id: i64, roles: &[&str]) -> Self {
        self.add_token(token, user_id, roles);
        self
    }

    /// Registers an account that may log in.
    pub fn with_account(self, email: &str, password: &str, roles: &[&str]) -> Self {
        self.add_account(email, password, roles);
        self
    }

    /// Forces every call to fail with `error`.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = Some(error);
        self
    }

    pub fn clear_error(&self) {
        *self.force_error.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn add_token(&self, token: impl Into<String>, user_id: i64, roles: &[&str]) {
        let Ok(user_id) = UserId::new(user_id) else {
            return;
        };
        let check = TokenCheck {
            user_id,
            email: format!("user{}@gym.test", user_id),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            valid: true,
        };
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .insert(token.into(), check);
    }

    pub fn remove_token(&self, token: &str) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .remove(token);
    }

    pub fn add_account(&self, email: &str, password: &str, roles: &[&str]) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.last_user_id += 1;
        let Ok(user_id) = UserId::new(state.last_user_id) else {
            return;
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id,
                password: password.to_string(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
    }

    fn forced(&self) -> Result<(), AuthError> {
        match self
            .force_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        self.forced()?;
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let account = state
            .accounts
            .get(email)
            .filter(|a| a.password == password)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)?;

        let token = format!("token-{}", email);
        state.tokens.insert(
            token.clone(),
            TokenCheck {
                user_id: account.user_id,
                email: email.to_string(),
                roles: account.roles,
                valid: true,
            },
        );
        Ok(token)
    }

    async fn register(&self, email: &str, password: &str) -> Result<UserId, AuthError> {
        self.forced()?;
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidRequest(
                "email and password are required".to_string(),
            ));
        }
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.accounts.contains_key(email) {
            return Err(AuthError::UserExists);
        }
        state.last_user_id += 1;
        let user_id = UserId::new(state.last_user_id)
            .map_err(|e| AuthError::service_unavailable(e.to_string()))?;
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id,
                password: password.to_string(),
                roles: Vec::new(),
            },
        );
        Ok(user_id)
    }

    async fn check_token(&self, token: &str) -> Result<TokenCheck, AuthError> {
        self.forced()?;
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}

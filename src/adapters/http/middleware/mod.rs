//! HTTP middleware for axum.
//!
//! - `auth` - token check against the SSO service and the admin gate

pub mod auth;

pub use auth::{
    auth_middleware, extract_token, require_admin, AuthRejection, RequireAuth, TOKEN_COOKIE,
};

//! `/auth` endpoints backed by the SSO service.

use axum::{
    extract::State,
    http::{header, HeaderValue},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::dto::MessageResponse;
use super::error::AuthApiError;
use super::middleware::{auth_middleware, RequireAuth, TOKEN_COOKIE};
use super::state::AppState;
use crate::domain::foundation::{AuthError, UserId};

/// Lifetime of the login cookie in seconds.
pub const TOKEN_COOKIE_MAX_AGE: u64 = 360_000;

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsRequest {
    fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() {
            return Err(AuthError::InvalidRequest("email is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(AuthError::InvalidRequest("password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeResponse {
    pub user_id: UserId,
    pub email: String,
    pub roles: Vec<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(me)
}

fn token_cookie(token: &str) -> Result<HeaderValue, AuthError> {
    let cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        TOKEN_COOKIE, token, TOKEN_COOKIE_MAX_AGE
    );
    HeaderValue::from_str(&cookie)
        .map_err(|_| AuthError::service_unavailable("SSO returned a token unfit for a cookie"))
}

/// Logs in and stores the token in an HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Response, AuthApiError> {
    body.validate()?;
    let token = state.identity.login(body.email.trim(), &body.password).await?;
    let cookie = token_cookie(&token)?;
    tracing::info!("Login successful");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::new("Login successful")),
    )
        .into_response())
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsRequest>,
) -> Result<Json<RegisterResponse>, AuthApiError> {
    body.validate()?;
    let user_id = state
        .identity
        .register(body.email.trim(), &body.password)
        .await?;
    tracing::info!(user_id = %user_id, "User registered");
    Ok(Json(RegisterResponse { user_id }))
}

/// The caller as the SSO service sees them.
pub async fn me(RequireAuth(user): RequireAuth) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: user.id,
        email: user.email,
        roles: user.roles,
    })
}

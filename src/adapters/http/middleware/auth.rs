//! Authentication middleware and extractors for axum.
//!
//! - `auth_middleware` - checks the caller's token with the `IdentityProvider`
//!   and injects `AuthenticatedUser` into request extensions
//! - `require_admin` - route layer that rejects callers without the admin role
//! - `RequireAuth` - extractor for handlers that need the caller
//!
//! ```text
//! Request → auth_middleware → AuthenticatedUser in extensions
//!                                      ↓
//!                  require_admin (mutating routes only)
//!                                      ↓
//!                                   Handler
//! ```
//!
//! The token is taken from the `token` cookie first, then from an
//! `Authorization: Bearer <token>` header.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{AuthApiError, ErrorResponse};
use crate::adapters::http::state::AppState;
use crate::domain::foundation::{AuthError, AuthenticatedUser};

/// Name of the cookie set by login.
pub const TOKEN_COOKIE: &str = "token";

/// Returns the caller's token, if any.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    })
}

/// Rejects requests without a token the SSO service accepts.
///
/// - missing or rejected token: 401
/// - SSO service unreachable: 503
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers()) else {
        return AuthRejection::Unauthenticated.into_response();
    };

    let user = match state.identity.check_token(&token).await {
        Ok(check) => check.into_user(),
        Err(e) => Err(e),
    };

    match user {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(AuthError::ServiceUnavailable(detail)) => {
            AuthApiError(AuthError::ServiceUnavailable(detail)).into_response()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token rejected");
            AuthRejection::Unauthenticated.into_response()
        }
    }
}

/// Lets through only callers holding the configured admin role.
///
/// Must run after `auth_middleware`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match request.extensions().get::<AuthenticatedUser>() {
        Some(user) if user.has_role(&state.admin_role) => next.run(request).await,
        Some(user) => {
            tracing::info!(user_id = %user.id, "Admin role required");
            AuthRejection::Forbidden.into_response()
        }
        None => AuthRejection::Unauthenticated.into_response(),
    }
}

/// Extractor that requires authentication.
///
/// Returns 401 when `auth_middleware` did not run or rejected the token.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> axum::extract::FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .cloned()
                .map(RequireAuth)
                .ok_or(AuthRejection::Unauthenticated)
        })
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No valid token was provided.
    Unauthenticated,
    /// The caller lacks the admin role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required",
            ),
            AuthRejection::Forbidden => {
                (StatusCode::FORBIDDEN, "FORBIDDEN", "Insufficient permissions")
            }
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{HeaderValue, Request as HttpRequest};
    use axum::routing::get;
    use axum::{middleware, Router};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::adapters::clock::FixedClock;
    use crate::domain::foundation::UserId;

    fn state(identity: MockIdentityProvider) -> AppState {
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
        AppState::in_memory(Arc::new(identity), clock, "admin")
    }

    fn identity() -> MockIdentityProvider {
        MockIdentityProvider::new()
            .with_token("desk-token", 1, &["staff"])
            .with_token("admin-token", 2, &["admin"])
    }

    async fn whoami(RequireAuth(user): RequireAuth) -> String {
        user.id.to_string()
    }

    fn app(state: AppState) -> Router {
        let admin = Router::new()
            .route("/admin", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));
        Router::new()
            .route("/me", get(whoami))
            .merge(admin)
            .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state)
    }

    async fn status(app: Router, uri: &str, header: Option<(&str, &str)>) -> StatusCode {
        let mut builder = HttpRequest::builder().uri(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Token Extraction
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn token_is_read_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc"));
        assert_eq!(extract_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn token_is_read_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers), Some("xyz".to_string()));
    }

    #[test]
    fn cookie_wins_over_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token=abc"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(extract_token(&headers), Some("abc".to_string()));
    }

    #[test]
    fn other_schemes_and_empty_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(extract_token(&headers), None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Middleware
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let app = app(state(identity()));
        assert_eq!(status(app, "/me", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let app = app(state(identity()));
        let code = status(app, "/me", Some(("authorization", "Bearer nope"))).await;
        assert_eq!(code, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let app = app(state(identity()));
        let code = status(app, "/me", Some(("cookie", "token=desk-token"))).await;
        assert_eq!(code, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_route_needs_admin_role() {
        let desk = status(
            app(state(identity())),
            "/admin",
            Some(("authorization", "Bearer desk-token")),
        )
        .await;
        assert_eq!(desk, StatusCode::FORBIDDEN);

        let admin = status(
            app(state(identity())),
            "/admin",
            Some(("authorization", "Bearer admin-token")),
        )
        .await;
        assert_eq!(admin, StatusCode::OK);
    }

    #[tokio::test]
    async fn unavailable_identity_service_is_503() {
        let identity = identity().with_error(AuthError::service_unavailable("connection refused"));
        let code = status(
            app(state(identity)),
            "/me",
            Some(("authorization", "Bearer admin-token")),
        )
        .await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // RequireAuth Extractor
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn require_auth_fails_without_user() {
        use axum::extract::FromRequestParts;

        let request: HttpRequest<()> = HttpRequest::builder().uri("/test").body(()).unwrap();
        let (mut parts, _body) = request.into_parts();

        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthenticated)));
    }

    #[tokio::test]
    async fn require_auth_extracts_user_from_extensions() {
        use axum::extract::FromRequestParts;

        let mut request: HttpRequest<()> = HttpRequest::builder().uri("/test").body(()).unwrap();
        request.extensions_mut().insert(AuthenticatedUser::new(
            UserId::new(5).unwrap(),
            "desk@gym.test",
            vec![],
        ));
        let (mut parts, _body) = request.into_parts();

        let RequireAuth(user) = RequireAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.email, "desk@gym.test");
    }
}

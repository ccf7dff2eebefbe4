//! Router assembly.
//!
//! ```text
//! /health          no auth
//! /auth/...        login, register, me
//! everything else  valid token; mutating routes also need the admin role
//! ```

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::middleware::auth_middleware;
use super::state::AppState;
use super::{auth, freezes, people, person_subscriptions, plans, single_visits, statistics};
use crate::config::ServerConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Routes without the transport layers; used directly by tests.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/people", people::routes(state.clone()))
        .nest("/subscription", plans::routes(state.clone()))
        .nest("/person_sub", person_subscriptions::routes(state.clone()))
        .nest("/freeze", freezes::routes(state.clone()))
        .nest("/single_visit", single_visits::routes(state.clone()))
        .nest("/statistics", statistics::routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::routes(state.clone()))
        .merge(protected)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// The full application: routes plus request id, tracing, timeout and CORS.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    api_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(config.request_timeout()))
            .layer(cors_layer(config)),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::adapters::clock::FixedClock;

    fn app() -> Router {
        let identity = MockIdentityProvider::new()
            .with_token("admin-token", 1, &["admin"])
            .with_token("desk-token", 2, &["staff"])
            .with_account("owner@gym.test", "secret", &["admin"]);
        let clock = Arc::new(FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()));
        api_router(AppState::in_memory(Arc::new(identity), clock, "admin"))
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Health and auth gate
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn health_needs_no_token() {
        let response = app().oneshot(request("GET", "/health", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn reads_need_a_token() {
        let response = app().oneshot(request("GET", "/people", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn writes_need_the_admin_role() {
        let body = json!({"full_name": "Ann Lee", "phone": "+7 900 000-01-00"});
        let response = app()
            .oneshot(request("POST", "/people/add", Some("desk-token"), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn staff_can_read() {
        let response = app()
            .oneshot(request("GET", "/subscription", Some("desk-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Resources
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn added_person_can_be_found() {
        let app = app();
        let body = json!({"full_name": "Ann Lee", "phone": "+7 900 000-01-00"});
        let response = app
            .clone()
            .oneshot(request("POST", "/people/add", Some("admin-token"), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = json_body(response).await["id"].as_i64().unwrap();

        let response = app
            .oneshot(request("GET", &format!("/people/find/{}", id), Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["full_name"], "Ann Lee");
    }

    #[tokio::test]
    async fn malformed_id_is_a_validation_error() {
        let response = app()
            .oneshot(request("GET", "/people/find/abc", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["fields"]["person_id"].is_string());
    }

    #[tokio::test]
    async fn unknown_subscription_is_not_found() {
        let response = app()
            .oneshot(request("GET", "/person_sub/find/404", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "SUBSCRIPTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn ranged_statistics_require_both_dates() {
        let response = app()
            .oneshot(request("GET", "/statistics/income?from=2024-01-01", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["fields"]["to"].is_string());
    }

    #[tokio::test]
    async fn single_visit_day_rejects_other_date_formats() {
        let response = app()
            .oneshot(request("GET", "/single_visit/day?date=10.03.2024", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Login
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn login_sets_http_only_cookie() {
        let body = json!({"email": "owner@gym.test", "password": "secret"});
        let response = app()
            .oneshot(request("POST", "/auth/login", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token=token-owner@gym.test"));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let body = json!({"email": "owner@gym.test", "password": "nope"});
        let response = app()
            .oneshot(request("POST", "/auth/login", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_reports_roles() {
        let response = app()
            .oneshot(request("GET", "/auth/me", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["roles"], json!(["admin"]));
    }
}

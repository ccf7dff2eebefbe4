//! `/subscription` endpoints: subscription plans.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::dto::{CreatedResponse, MessageResponse};
use super::error::ApiError;
use super::middleware::require_admin;
use super::state::AppState;
use crate::application::handlers::PlanCommand;
use crate::domain::foundation::PlanId;
use crate::domain::plans::SubscriptionPlan;

/// Body of add and update. Amounts are minor units.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub title: String,
    pub price: i64,
    pub duration_days: i64,
    #[serde(default)]
    pub freeze_days: i64,
}

impl From<PlanRequest> for PlanCommand {
    fn from(body: PlanRequest) -> Self {
        PlanCommand {
            title: body.title,
            price: body.price,
            duration_days: body.duration_days,
            freeze_days: body.freeze_days,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/add", post(add_plan))
        .route("/update/:id", put(update_plan))
        .route("/delete/:id", delete(delete_plan))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new().route("/", get(list_plans)).merge(admin)
}

pub async fn list_plans(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionPlan>>, ApiError> {
    Ok(Json(state.plan_queries().all().await?))
}

pub async fn add_plan(
    State(state): State<AppState>,
    Json(body): Json<PlanRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<PlanId>>), ApiError> {
    let id = state.plan_commands().add(body.into()).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PlanRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: PlanId = id.parse()?;
    state.plan_commands().update(id, body.into()).await?;
    Ok(Json(MessageResponse::new("Subscription plan updated")))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: PlanId = id.parse()?;
    state.plan_commands().delete(id).await?;
    Ok(Json(MessageResponse::new("Subscription plan deleted")))
}

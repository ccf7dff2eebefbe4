//! `/freeze` endpoints.

use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use super::error::ApiError;
use super::middleware::require_admin;
use super::state::AppState;
use crate::application::handlers::{FreezeSubscriptionCommand, UnfreezeSubscriptionCommand};
use crate::domain::subscription::SubscriptionFreeze;
use crate::ports::ActiveFreezeView;

#[derive(Debug, Clone, Deserialize)]
pub struct FreezeRequest {
    #[serde(default)]
    pub number: String,
    /// Today when absent.
    pub freeze_start: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnfreezeRequest {
    #[serde(default)]
    pub number: String,
    /// Today when absent.
    pub unfreeze_date: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/add", post(freeze_subscription))
        .route("/unfreeze", post(unfreeze_subscription))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/", get(list_active))
        .route("/history/:number", get(history))
        .merge(admin)
}

pub async fn list_active(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActiveFreezeView>>, ApiError> {
    Ok(Json(state.list_freezes_handler().active().await?))
}

pub async fn history(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<Vec<SubscriptionFreeze>>, ApiError> {
    Ok(Json(state.list_freezes_handler().history(&number).await?))
}

/// Returns the opened interval.
pub async fn freeze_subscription(
    State(state): State<AppState>,
    Json(body): Json<FreezeRequest>,
) -> Result<Json<SubscriptionFreeze>, ApiError> {
    let freeze = state
        .freeze_handler()
        .handle(FreezeSubscriptionCommand {
            number: body.number,
            freeze_start: body.freeze_start,
        })
        .await?;
    Ok(Json(freeze))
}

/// Returns the closed interval with its days used.
pub async fn unfreeze_subscription(
    State(state): State<AppState>,
    Json(body): Json<UnfreezeRequest>,
) -> Result<Json<SubscriptionFreeze>, ApiError> {
    let freeze = state
        .unfreeze_handler()
        .handle(UnfreezeSubscriptionCommand {
            number: body.number,
            unfreeze_date: body.unfreeze_date,
        })
        .await?;
    Ok(Json(freeze))
}

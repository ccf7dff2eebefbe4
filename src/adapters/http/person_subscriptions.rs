//! `/person_sub` endpoints: subscriptions sold to people.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::dto::{MessageResponse, NameQuery};
use super::error::ApiError;
use super::middleware::require_admin;
use super::state::AppState;
use crate::application::handlers::{AddPersonSubscriptionCommand, DeletePersonSubscriptionCommand};
use crate::domain::foundation::{PersonId, SubscriptionNumber};
use crate::domain::subscription::PersonSubscriptionDraft;
use crate::domain::GymError;
use crate::ports::PersonSubscriptionView;

/// Body of add. Missing dates and prices default from the plan.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddPersonSubscriptionRequest {
    #[serde(default)]
    pub number: String,
    pub person_id: Option<i64>,
    pub subscription_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub discount: Option<i64>,
    pub final_price: Option<i64>,
    pub subscription_price: Option<i64>,
}

impl From<AddPersonSubscriptionRequest> for PersonSubscriptionDraft {
    fn from(body: AddPersonSubscriptionRequest) -> Self {
        PersonSubscriptionDraft {
            number: body.number,
            person_id: body.person_id,
            subscription_id: body.subscription_id,
            start_date: body.start_date,
            end_date: body.end_date,
            discount: body.discount,
            final_price: body.final_price,
            subscription_price: body.subscription_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPersonSubscriptionResponse {
    pub number: SubscriptionNumber,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/add", post(add_subscription))
        .route("/delete/:number", delete(delete_subscription))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/", get(list_subscriptions))
        .route("/find", get(find_by_person_name))
        .route("/find/:number", get(find_by_number))
        .route("/find/id/:id", get(find_by_person_id))
        .merge(admin)
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

pub async fn list_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PersonSubscriptionView>>, ApiError> {
    Ok(Json(state.person_subscription_queries().all().await?))
}

pub async fn find_by_number(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<PersonSubscriptionView>, ApiError> {
    Ok(Json(
        state.person_subscription_queries().by_number(&number).await?,
    ))
}

pub async fn find_by_person_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<PersonSubscriptionView>>, ApiError> {
    let name = query
        .name
        .ok_or_else(|| GymError::validation("name", "name is required"))?;
    Ok(Json(
        state
            .person_subscription_queries()
            .by_person_name(&name)
            .await?,
    ))
}

pub async fn find_by_person_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PersonSubscriptionView>>, ApiError> {
    let id: PersonId = id.parse()?;
    Ok(Json(
        state.person_subscription_queries().by_person_id(id).await?,
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// Commands
// ════════════════════════════════════════════════════════════════════════════════

pub async fn add_subscription(
    State(state): State<AppState>,
    Json(body): Json<AddPersonSubscriptionRequest>,
) -> Result<(StatusCode, Json<AddPersonSubscriptionResponse>), ApiError> {
    let number = state
        .add_person_subscription_handler()
        .handle(AddPersonSubscriptionCommand { draft: body.into() })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(AddPersonSubscriptionResponse { number }),
    ))
}

pub async fn delete_subscription(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .delete_person_subscription_handler()
        .handle(DeletePersonSubscriptionCommand { number })
        .await?;
    Ok(Json(MessageResponse::new("Person subscription deleted")))
}

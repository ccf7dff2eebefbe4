//! `/people` endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use super::dto::{CreatedResponse, MessageResponse, NameQuery};
use super::error::ApiError;
use super::middleware::require_admin;
use super::state::AppState;
use crate::application::handlers::{AddPersonCommand, UpdatePersonCommand};
use crate::domain::foundation::PersonId;
use crate::domain::people::Person;
use crate::domain::GymError;

/// Body of add and update.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/add", post(add_person))
        .route("/update/:id", put(update_person))
        .route("/delete/:id", delete(delete_person))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/", get(list_people))
        .route("/find", get(find_by_name))
        .route("/find/:id", get(find_by_id))
        .merge(admin)
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

pub async fn list_people(State(state): State<AppState>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(state.people_queries().all().await?))
}

pub async fn find_by_name(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<Person>>, ApiError> {
    let name = query
        .name
        .ok_or_else(|| GymError::validation("name", "name is required"))?;
    Ok(Json(state.people_queries().by_name(&name).await?))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    let id: PersonId = id.parse()?;
    Ok(Json(state.people_queries().by_id(id).await?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Commands
// ════════════════════════════════════════════════════════════════════════════════

pub async fn add_person(
    State(state): State<AppState>,
    Json(body): Json<PersonRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<PersonId>>), ApiError> {
    let id = state
        .add_person_handler()
        .handle(AddPersonCommand {
            full_name: body.full_name,
            phone: body.phone,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PersonRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: PersonId = id.parse()?;
    state
        .update_person_handler()
        .handle(UpdatePersonCommand {
            id,
            full_name: body.full_name,
            phone: body.phone,
        })
        .await?;
    Ok(Json(MessageResponse::new("Person updated")))
}

pub async fn delete_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: PersonId = id.parse()?;
    state.delete_person_handler().handle(id).await?;
    Ok(Json(MessageResponse::new("Person deleted")))
}

//! `/single_visit` endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use super::dto::{CreatedResponse, DayQuery, MessageResponse, RangeQuery};
use super::error::ApiError;
use super::middleware::require_admin;
use super::state::AppState;
use crate::application::handlers::AddSingleVisitCommand;
use crate::domain::foundation::{parse_date, SingleVisitId};
use crate::domain::statistics::DateRange;
use crate::domain::visits::SingleVisit;
use crate::domain::GymError;

#[derive(Debug, Clone, Deserialize)]
pub struct AddSingleVisitRequest {
    pub visit_date: Option<String>,
    pub final_price: i64,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/add", post(add_visit))
        .route("/delete/:id", delete(delete_visit))
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new()
        .route("/", get(list_visits))
        .route("/day", get(visits_by_day))
        .route("/period", get(visits_by_period))
        .route("/:id", get(find_by_id))
        .merge(admin)
}

// ════════════════════════════════════════════════════════════════════════════════
// Queries
// ════════════════════════════════════════════════════════════════════════════════

pub async fn list_visits(
    State(state): State<AppState>,
) -> Result<Json<Vec<SingleVisit>>, ApiError> {
    Ok(Json(state.single_visit_queries().all().await?))
}

pub async fn find_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SingleVisit>, ApiError> {
    let id: SingleVisitId = id.parse()?;
    Ok(Json(state.single_visit_queries().by_id(id).await?))
}

pub async fn visits_by_day(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<SingleVisit>>, ApiError> {
    let raw = query
        .date
        .ok_or_else(|| GymError::validation("date", "date is required"))?;
    let day = parse_date("date", &raw)?;
    Ok(Json(state.single_visit_queries().by_day(day).await?))
}

pub async fn visits_by_period(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<SingleVisit>>, ApiError> {
    let range = DateRange::parse(query.from.as_deref(), query.to.as_deref())?;
    Ok(Json(state.single_visit_queries().by_period(&range).await?))
}

// ════════════════════════════════════════════════════════════════════════════════
// Commands
// ════════════════════════════════════════════════════════════════════════════════

pub async fn add_visit(
    State(state): State<AppState>,
    Json(body): Json<AddSingleVisitRequest>,
) -> Result<(StatusCode, Json<CreatedResponse<SingleVisitId>>), ApiError> {
    let id = state
        .single_visit_commands()
        .add(AddSingleVisitCommand {
            visit_date: body.visit_date,
            final_price: body.final_price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

pub async fn delete_visit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id: SingleVisitId = id.parse()?;
    state.single_visit_commands().delete(id).await?;
    Ok(Json(MessageResponse::new("Single visit deleted")))
}

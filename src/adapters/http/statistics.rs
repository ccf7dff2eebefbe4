//! `/statistics` endpoints.
//!
//! Counts answer `{"total": n}`, amounts `{"income": n}` in minor units.
//! Ranged endpoints require `?from=&to=`.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::dto::{IncomeResponse, RangeQuery, TotalResponse};
use super::error::ApiError;
use super::state::AppState;
use crate::domain::statistics::{DateRange, MonthlyStat};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/total_clients", get(total_clients))
        .route("/new_clients", get(new_clients))
        .route("/total_income", get(total_income))
        .route("/income", get(income))
        .route("/total_sold_subscriptions", get(total_sold_subscriptions))
        .route("/sold_subscriptions", get(sold_subscriptions))
        .route("/monthly", get(monthly))
        .route("/total_single_visits", get(total_single_visits))
        .route("/single_visits", get(single_visits))
        .route("/single_visits_income", get(single_visits_income))
}

fn range(query: &RangeQuery) -> Result<DateRange, ApiError> {
    Ok(DateRange::parse(query.from.as_deref(), query.to.as_deref())?)
}

fn total(total: i64) -> Json<TotalResponse> {
    Json(TotalResponse { total })
}

pub async fn total_clients(State(state): State<AppState>) -> Result<Json<TotalResponse>, ApiError> {
    Ok(total(state.statistics_handler().total_clients().await?))
}

pub async fn new_clients(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<TotalResponse>, ApiError> {
    let range = range(&query)?;
    Ok(total(state.statistics_handler().new_clients(&range).await?))
}

pub async fn total_income(State(state): State<AppState>) -> Result<Json<IncomeResponse>, ApiError> {
    let income = state.statistics_handler().total_income().await?;
    Ok(Json(IncomeResponse {
        income: income.minor_units(),
    }))
}

pub async fn income(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<IncomeResponse>, ApiError> {
    let range = range(&query)?;
    let income = state.statistics_handler().income(&range).await?;
    Ok(Json(IncomeResponse {
        income: income.minor_units(),
    }))
}

pub async fn total_sold_subscriptions(
    State(state): State<AppState>,
) -> Result<Json<TotalResponse>, ApiError> {
    Ok(total(
        state.statistics_handler().total_sold_subscriptions().await?,
    ))
}

pub async fn sold_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<TotalResponse>, ApiError> {
    let range = range(&query)?;
    Ok(total(
        state.statistics_handler().sold_subscriptions(&range).await?,
    ))
}

pub async fn monthly(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<MonthlyStat>>, ApiError> {
    let range = range(&query)?;
    Ok(Json(state.statistics_handler().monthly(&range).await?))
}

pub async fn total_single_visits(
    State(state): State<AppState>,
) -> Result<Json<TotalResponse>, ApiError> {
    Ok(total(state.statistics_handler().total_single_visits().await?))
}

pub async fn single_visits(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<TotalResponse>, ApiError> {
    let range = range(&query)?;
    Ok(total(state.statistics_handler().single_visits(&range).await?))
}

pub async fn single_visits_income(
    State(state): State<AppState>,
) -> Result<Json<IncomeResponse>, ApiError> {
    let income = state.statistics_handler().single_visits_income().await?;
    Ok(Json(IncomeResponse {
        income: income.minor_units(),
    }))
}

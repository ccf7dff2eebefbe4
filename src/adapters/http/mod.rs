//! HTTP adapter - the axum REST surface.
//!
//! One module per resource, each exposing `routes()`; `app` nests them and
//! adds the transport layers.

pub mod app;
pub mod auth;
pub mod dto;
pub mod error;
pub mod freezes;
pub mod middleware;
pub mod people;
pub mod person_subscriptions;
pub mod plans;
pub mod single_visits;
pub mod state;
pub mod statistics;

pub use app::{api_router, router};
pub use error::{ApiError, AuthApiError, ErrorResponse};
pub use state::AppState;

//! Domain layer - entities, value objects and business rules.
//!
//! # Module Structure
//!
//! - `foundation` - identifiers, money, dates, errors
//! - `people` - gym members
//! - `plans` - subscription plans
//! - `subscription` - person subscriptions, status rules, freezes
//! - `visits` - single-visit sales
//! - `statistics` - date ranges and the monthly rollup
//! - `errors` - public error taxonomy

pub mod errors;
pub mod foundation;
pub mod people;
pub mod plans;
pub mod statistics;
pub mod subscription;
pub mod visits;

pub use errors::{ErrorKind, GymError};

//! Cache support for the application handlers.
//!
//! - `keys` - every cache key and TTL the handlers use
//! - `invalidation` - named invalidation sets and the best-effort invalidator
//! - `read_through` - cached query helper
//!
//! Cache failures never reach callers. Reads fall back to storage and
//! invalidations are logged and skipped.

pub mod invalidation;
pub mod keys;
mod read_through;

pub use invalidation::{
    CacheInvalidator, InvalidationSet, PERSON_SUBSCRIPTION_FAMILY, STATISTICS_FAMILY,
};
pub use read_through::read_through;

//! Clock port.
//!
//! Supplies the business date "today". Subscription status and freeze
//! accounting compare calendar dates, so the clock hands out a date rather
//! than an instant.

use chrono::NaiveDate;

/// Source of the current business date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

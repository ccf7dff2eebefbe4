//! Calendar-date helpers.
//!
//! Every date on the wire and in storage is a plain calendar date rendered as
//! `YYYY-MM-DD`. Business comparisons ("is this subscription current?") are
//! made between calendar dates only; "today" is supplied by the `Clock` port
//! and never derived from a truncated timestamp.

use chrono::{Duration, NaiveDate};

use super::ValidationError;

/// Canonical date format for requests, responses and cache keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` date, reporting failures against `field`.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if raw.len() != 10 {
        return Err(ValidationError::invalid_format(field, "expected YYYY-MM-DD"));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationError::invalid_format(field, "expected YYYY-MM-DD"))
}

/// Parses an optional date, treating blank input as absent.
pub fn parse_optional_date(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Renders a date in the canonical format.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Adds whole days, returning `None` past the representable range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// Whole days from `from` to `to`; negative when `to` precedes `from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

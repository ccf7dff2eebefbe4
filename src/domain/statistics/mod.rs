//! Derived business statistics.
//!
//! Nothing here is stored. Figures are recomputed from subscriptions and
//! single visits for the requested date range.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{format_date, parse_date, FieldErrors, Money};

/// Inclusive calendar-date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Fails when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, FieldErrors> {
        if from > to {
            let mut errors = FieldErrors::new();
            errors.add("from", "from must not be after to");
            return Err(errors);
        }
        Ok(Self { from, to })
    }

    /// Parses both ends from `YYYY-MM-DD` strings.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut parse = |field: &str, raw: Option<&str>| match raw {
            None => {
                errors.add(field, format!("{} is required", field));
                None
            }
            Some(raw) => parse_date(field, raw).map_err(|e| errors.add_error(&e)).ok(),
        };
        let from = parse("from", from);
        let to = parse("to", to);
        match (from, to) {
            (Some(from), Some(to)) => Self::new(from, to),
            _ => Err(errors),
        }
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// `{from}:{to}` at day granularity, for cache keys.
    pub fn key_suffix(&self) -> String {
        format!("{}:{}", format_date(self.from), format_date(self.to))
    }

    /// First day of every calendar month touched by the range, in order.
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        let mut cursor = month_start(self.from);
        let last = month_start(self.to);
        while cursor <= last {
            months.push(cursor);
            cursor = next_month(cursor);
        }
        months
    }
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

/// `YYYY-MM` label of a month.
pub fn month_label(first: NaiveDate) -> String {
    first.format("%Y-%m").to_string()
}

/// Subscription figures for one month, bucketed by start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySubscriptionTotals {
    /// First day of the month.
    pub month: NaiveDate,
    pub income: Money,
    pub new_clients: i64,
    pub sold_subscriptions: i64,
}

/// Single-visit figures for one month, bucketed by visit date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyVisitTotals {
    /// First day of the month.
    pub month: NaiveDate,
    pub income: Money,
    pub count: i64,
}

/// One row of the monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyStat {
    /// `YYYY-MM`.
    pub month: String,
    pub income: Money,
    pub new_clients: i64,
    pub sold_subscriptions: i64,
    pub single_visits_income: Money,
    pub single_visits_count: i64,
}

impl MonthlyStat {
    fn empty(month: NaiveDate) -> Self {
        Self {
            month: month_label(month),
            income: Money::ZERO,
            new_clients: 0,
            sold_subscriptions: 0,
            single_visits_income: Money::ZERO,
            single_visits_count: 0,
        }
    }

    /// Merges sparse per-month totals into one row for every month of
    /// `range`, oldest first. Months without activity get an all-zero row;
    /// totals outside the range are ignored.
    pub fn rollup(
        range: &DateRange,
        subscriptions: &[MonthlySubscriptionTotals],
        visits: &[MonthlyVisitTotals],
    ) -> Vec<MonthlyStat> {
        let mut rows: BTreeMap<NaiveDate, MonthlyStat> = range
            .months()
            .into_iter()
            .map(|m| (m, MonthlyStat::empty(m)))
            .collect();

        for totals in subscriptions {
            if let Some(row) = rows.get_mut(&month_start(totals.month)) {
                row.income = row.income + totals.income;
                row.new_clients += totals.new_clients;
                row.sold_subscriptions += totals.sold_subscriptions;
            }
        }
        for totals in visits {
            if let Some(row) = rows.get_mut(&month_start(totals.month)) {
                row.single_visits_income = row.single_visits_income + totals.income;
                row.single_visits_count += totals.count;
            }
        }

        rows.into_values().collect()
    }
}

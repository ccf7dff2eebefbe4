//! PostgreSQL implementation of StatisticsReader.
//!
//! Income is plan price minus discount, summed over subscriptions bucketed
//! by `start_date`. Visit figures bucket by `visit_date`.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, Money};
use crate::domain::statistics::{DateRange, MonthlySubscriptionTotals, MonthlyVisitTotals};
use crate::ports::StatisticsReader;

use super::errors::db_error;

/// PostgreSQL implementation of StatisticsReader.
#[derive(Clone)]
pub struct PostgresStatisticsReader {
    pool: PgPool,
}

impl PostgresStatisticsReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn scalar(&self, sql: &str, context: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(context, e))
    }

    async fn ranged_scalar(
        &self,
        sql: &str,
        range: &DateRange,
        context: &str,
    ) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(sql)
            .bind(range.from())
            .bind(range.to())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error(context, e))
    }
}

#[async_trait]
impl StatisticsReader for PostgresStatisticsReader {
    async fn total_clients(&self) -> Result<i64, DomainError> {
        self.scalar("SELECT COUNT(*) FROM person", "count clients")
            .await
    }

    async fn new_clients(&self, range: &DateRange) -> Result<i64, DomainError> {
        self.ranged_scalar(
            r#"
            SELECT COUNT(DISTINCT person_id)
            FROM person_subscriptions
            WHERE start_date BETWEEN $1 AND $2
            "#,
            range,
            "count new clients",
        )
        .await
    }

    async fn total_income(&self) -> Result<Money, DomainError> {
        self.scalar(
            r#"
            SELECT COALESCE(SUM(s.price - ps.discount), 0)::BIGINT
            FROM person_subscriptions ps
            JOIN subscriptions s ON ps.subscription_id = s.id
            "#,
            "sum income",
        )
        .await
        .map(Money::from_minor)
    }

    async fn income(&self, range: &DateRange) -> Result<Money, DomainError> {
        self.ranged_scalar(
            r#"
            SELECT COALESCE(SUM(s.price - ps.discount), 0)::BIGINT
            FROM person_subscriptions ps
            JOIN subscriptions s ON ps.subscription_id = s.id
            WHERE ps.start_date BETWEEN $1 AND $2
            "#,
            range,
            "sum income in range",
        )
        .await
        .map(Money::from_minor)
    }

    async fn total_sold_subscriptions(&self) -> Result<i64, DomainError> {
        self.scalar(
            "SELECT COUNT(*) FROM person_subscriptions",
            "count sold subscriptions",
        )
        .await
    }

    async fn sold_subscriptions(&self, range: &DateRange) -> Result<i64, DomainError> {
        self.ranged_scalar(
            "SELECT COUNT(*) FROM person_subscriptions WHERE start_date BETWEEN $1 AND $2",
            range,
            "count sold subscriptions in range",
        )
        .await
    }

    async fn total_single_visits(&self) -> Result<i64, DomainError> {
        self.scalar("SELECT COUNT(*) FROM single_visits", "count single visits")
            .await
    }

    async fn single_visits(&self, range: &DateRange) -> Result<i64, DomainError> {
        self.ranged_scalar(
            "SELECT COUNT(*) FROM single_visits WHERE visit_date BETWEEN $1 AND $2",
            range,
            "count single visits in range",
        )
        .await
    }

    async fn single_visits_income(&self) -> Result<Money, DomainError> {
        self.scalar(
            "SELECT COALESCE(SUM(final_price), 0)::BIGINT FROM single_visits",
            "sum single visit income",
        )
        .await
        .map(Money::from_minor)
    }

    async fn monthly_subscription_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlySubscriptionTotals>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT DATE_TRUNC('month', ps.start_date)::DATE AS month,
                   COALESCE(SUM(s.price - ps.discount), 0)::BIGINT AS income,
                   COUNT(DISTINCT ps.person_id) AS new_clients,
                   COUNT(*) AS sold_subscriptions
            FROM person_subscriptions ps
            JOIN subscriptions s ON ps.subscription_id = s.id
            WHERE ps.start_date BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(range.from())
        .bind(range.to())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("aggregate monthly subscriptions", e))?;

        Ok(rows
            .into_iter()
            .map(|row| MonthlySubscriptionTotals {
                month: row.get::<NaiveDate, _>("month"),
                income: Money::from_minor(row.get("income")),
                new_clients: row.get("new_clients"),
                sold_subscriptions: row.get("sold_subscriptions"),
            })
            .collect())
    }

    async fn monthly_visit_totals(
        &self,
        range: &DateRange,
    ) -> Result<Vec<MonthlyVisitTotals>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT DATE_TRUNC('month', visit_date)::DATE AS month,
                   COALESCE(SUM(final_price), 0)::BIGINT AS income,
                   COUNT(*) AS count
            FROM single_visits
            WHERE visit_date BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(range.from())
        .bind(range.to())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("aggregate monthly visits", e))?;

        Ok(rows
            .into_iter()
            .map(|row| MonthlyVisitTotals {
                month: row.get::<NaiveDate, _>("month"),
                income: Money::from_minor(row.get("income")),
                count: row.get("count"),
            })
            .collect())
    }
}

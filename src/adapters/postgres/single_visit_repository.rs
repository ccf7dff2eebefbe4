//! PostgreSQL implementation of SingleVisitRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Money, SingleVisitId};
use crate::domain::statistics::DateRange;
use crate::domain::visits::{SingleVisit, SingleVisitDetails};
use crate::ports::SingleVisitRepository;

use super::errors::{corrupt, db_error};

/// PostgreSQL implementation of SingleVisitRepository.
#[derive(Clone)]
pub struct PostgresSingleVisitRepository {
    pool: PgPool,
}

impl PostgresSingleVisitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_visit(row: sqlx::postgres::PgRow) -> Result<SingleVisit, DomainError> {
    Ok(SingleVisit {
        id: corrupt("single_visits.id", SingleVisitId::new(row.get("id")))?,
        visit_date: row.get("visit_date"),
        final_price: Money::from_minor(row.get("final_price")),
    })
}

#[async_trait]
impl SingleVisitRepository for PostgresSingleVisitRepository {
    async fn save(&self, details: &SingleVisitDetails) -> Result<SingleVisitId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO single_visits (visit_date, final_price) VALUES ($1, $2) RETURNING id",
        )
        .bind(details.visit_date)
        .bind(details.final_price.minor_units())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("insert single visit", e))?;

        corrupt("single_visits.id", SingleVisitId::new(id))
    }

    async fn delete(&self, id: SingleVisitId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM single_visits WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete single visit", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SingleVisitNotFound,
                format!("single visit {} not found", id),
            )
            .with_detail("id", id.to_string()));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: SingleVisitId) -> Result<Option<SingleVisit>, DomainError> {
        let row = sqlx::query("SELECT id, visit_date, final_price FROM single_visits WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("fetch single visit", e))?;

        row.map(row_to_visit).transpose()
    }

    async fn list_all(&self) -> Result<Vec<SingleVisit>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, visit_date, final_price
            FROM single_visits
            ORDER BY visit_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list single visits", e))?;

        rows.into_iter().map(row_to_visit).collect()
    }

    async fn list_by_day(&self, day: NaiveDate) -> Result<Vec<SingleVisit>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, visit_date, final_price
            FROM single_visits
            WHERE visit_date = $1
            ORDER BY id DESC
            "#,
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list single visits by day", e))?;

        rows.into_iter().map(row_to_visit).collect()
    }

    async fn list_by_period(&self, range: &DateRange) -> Result<Vec<SingleVisit>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, visit_date, final_price
            FROM single_visits
            WHERE visit_date BETWEEN $1 AND $2
            ORDER BY visit_date DESC, id DESC
            "#,
        )
        .bind(range.from())
        .bind(range.to())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list single visits by period", e))?;

        rows.into_iter().map(row_to_visit).collect()
    }
}

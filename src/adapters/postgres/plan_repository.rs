//! PostgreSQL implementation of PlanRepository.
//!
//! Plans live in the `subscriptions` table.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Money, PlanId};
use crate::domain::plans::{PlanDetails, SubscriptionPlan};
use crate::ports::PlanRepository;

use super::errors::{
    corrupt, db_error, from_int4, is_foreign_key_violation, plan_not_found, to_int4,
};

const SUBSCRIPTION_PLAN_FKEY: &str = "person_subscriptions_subscription_id_fkey";

/// PostgreSQL implementation of PlanRepository.
#[derive(Clone)]
pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_plan(row: sqlx::postgres::PgRow) -> Result<SubscriptionPlan, DomainError> {
    Ok(SubscriptionPlan {
        id: corrupt("subscriptions.id", PlanId::new(row.get("id")))?,
        title: row.get("title"),
        price: Money::from_minor(row.get("price")),
        duration_days: from_int4("duration_days", row.get("duration_days"))?,
        freeze_days: from_int4("freeze_days", row.get("freeze_days"))?,
    })
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn save(&self, details: &PlanDetails) -> Result<PlanId, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO subscriptions (title, price, duration_days, freeze_days)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&details.title)
        .bind(details.price.minor_units())
        .bind(to_int4("duration_days", details.duration_days)?)
        .bind(to_int4("freeze_days", details.freeze_days)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("insert plan", e))?;

        corrupt("subscriptions.id", PlanId::new(id))
    }

    async fn update(&self, plan: &SubscriptionPlan) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                title = $2,
                price = $3,
                duration_days = $4,
                freeze_days = $5
            WHERE id = $1
            "#,
        )
        .bind(plan.id.as_i64())
        .bind(&plan.title)
        .bind(plan.price.minor_units())
        .bind(to_int4("duration_days", plan.duration_days)?)
        .bind(to_int4("freeze_days", plan.freeze_days)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update plan", e))?;

        if result.rows_affected() == 0 {
            return Err(plan_not_found(plan.id));
        }
        Ok(())
    }

    async fn delete(&self, id: PlanId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e, SUBSCRIPTION_PLAN_FKEY) {
                    DomainError::new(
                        ErrorCode::PlanInUse,
                        format!("plan {} is still referenced", id),
                    )
                    .with_detail("plan", id.to_string())
                } else {
                    db_error("delete plan", e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(plan_not_found(id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: PlanId) -> Result<Option<SubscriptionPlan>, DomainError> {
        let row = sqlx::query(
            "SELECT id, title, price, duration_days, freeze_days FROM subscriptions WHERE id = $1",
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch plan", e))?;

        row.map(row_to_plan).transpose()
    }

    async fn list_all(&self) -> Result<Vec<SubscriptionPlan>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, title, price, duration_days, freeze_days FROM subscriptions ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list plans", e))?;

        rows.into_iter().map(row_to_plan).collect()
    }
}

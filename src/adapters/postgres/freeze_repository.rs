//! PostgreSQL implementation of FreezeRepository.
//!
//! Freeze and unfreeze each run in one transaction that first locks the
//! subscription row with `SELECT ... FOR UPDATE`. The partial unique index
//! `subscription_freeze_open_key` backs the one-open-interval rule.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::foundation::{
    add_days, DomainError, ErrorCode, FreezeId, SubscriptionNumber,
};
use crate::domain::subscription::{FreezePolicy, SubscriptionFreeze, SubscriptionStatus};
use crate::ports::{ActiveFreezeView, FreezeRepository};

use super::errors::{
    corrupt, db_error, from_int4, is_unique_violation, parse_status, subscription_not_found,
};

const OPEN_FREEZE_KEY: &str = "subscription_freeze_open_key";

/// PostgreSQL implementation of FreezeRepository.
#[derive(Clone)]
pub struct PostgresFreezeRepository {
    pool: PgPool,
}

impl PostgresFreezeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool
            .begin()
            .await
            .map_err(|e| db_error("begin transaction", e))
    }
}

/// Subscription row as read under lock.
struct LockedSubscription {
    status: SubscriptionStatus,
    start_date: NaiveDate,
    end_date: NaiveDate,
    freeze_quota: u32,
}

async fn lock_subscription(
    tx: &mut Transaction<'static, Postgres>,
    number: &SubscriptionNumber,
) -> Result<LockedSubscription, DomainError> {
    let row = sqlx::query(
        r#"
        SELECT ps.status, ps.start_date, ps.end_date, s.freeze_days
        FROM person_subscriptions ps
        JOIN subscriptions s ON ps.subscription_id = s.id
        WHERE ps.number = $1
        FOR UPDATE OF ps
        "#,
    )
    .bind(number.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(|e| db_error("lock subscription", e))?
    .ok_or_else(|| subscription_not_found(number))?;

    let status: String = row.get("status");
    Ok(LockedSubscription {
        status: parse_status(&status)?,
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        freeze_quota: from_int4("freeze_days", row.get("freeze_days"))?,
    })
}

fn freeze_already_open(number: &SubscriptionNumber) -> DomainError {
    DomainError::new(
        ErrorCode::FreezeAlreadyOpen,
        "subscription already has an open freeze",
    )
    .with_detail("number", number.as_str())
}

fn row_to_freeze(row: sqlx::postgres::PgRow) -> Result<SubscriptionFreeze, DomainError> {
    let number: String = row.get("subscription_number");
    Ok(SubscriptionFreeze {
        id: corrupt("subscription_freeze.id", FreezeId::new(row.get("id")))?,
        subscription_number: corrupt("subscription_number", SubscriptionNumber::new(number))?,
        freeze_start: row.get("freeze_start"),
        freeze_end: row.get("freeze_end"),
        days_used: row.get("days_used"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

#[async_trait]
impl FreezeRepository for PostgresFreezeRepository {
    async fn freeze(
        &self,
        number: &SubscriptionNumber,
        freeze_start: NaiveDate,
        today: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError> {
        let mut tx = self.begin().await?;
        let locked = lock_subscription(&mut tx, number).await?;

        let usage = sqlx::query(
            r#"
            SELECT COALESCE(SUM(
                       CASE WHEN freeze_end IS NULL
                            THEN GREATEST($2::DATE - freeze_start, 0)
                            ELSE days_used
                       END), 0)::BIGINT AS used_days,
                   COALESCE(BOOL_OR(freeze_end IS NULL), FALSE) AS has_open
            FROM subscription_freeze
            WHERE subscription_number = $1
            "#,
        )
        .bind(number.as_str())
        .bind(today)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("read freeze usage", e))?;

        FreezePolicy {
            quota_days: locked.freeze_quota,
            used_days: usage.get("used_days"),
            status: locked.status,
            has_open_freeze: usage.get("has_open"),
            start_date: locked.start_date,
            end_date: locked.end_date,
        }
        .check(number, freeze_start, today)?;

        let row = sqlx::query(
            r#"
            INSERT INTO subscription_freeze (subscription_number, freeze_start, days_used)
            VALUES ($1, $2, 0)
            RETURNING id, subscription_number, freeze_start, freeze_end, days_used, created_at
            "#,
        )
        .bind(number.as_str())
        .bind(freeze_start)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, OPEN_FREEZE_KEY) {
                freeze_already_open(number)
            } else {
                db_error("insert freeze", e)
            }
        })?;
        let freeze = row_to_freeze(row)?;

        sqlx::query("UPDATE person_subscriptions SET status = $2 WHERE number = $1")
            .bind(number.as_str())
            .bind(SubscriptionStatus::Frozen.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("mark subscription frozen", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit freeze", e))?;

        tracing::debug!(number = %number, start = %freeze_start, "Subscription frozen");
        Ok(freeze)
    }

    async fn unfreeze(
        &self,
        number: &SubscriptionNumber,
        unfreeze_date: NaiveDate,
    ) -> Result<SubscriptionFreeze, DomainError> {
        let mut tx = self.begin().await?;
        let locked = lock_subscription(&mut tx, number).await?;

        let open = sqlx::query(
            r#"
            SELECT id, subscription_number, freeze_start, freeze_end, days_used, created_at
            FROM subscription_freeze
            WHERE subscription_number = $1 AND freeze_end IS NULL
            "#,
        )
        .bind(number.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("fetch open freeze", e))?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::FreezeNotFound,
                format!("subscription {} has no open freeze", number),
            )
            .with_detail("number", number.as_str())
        })?;
        let mut freeze = row_to_freeze(open)?;

        let used_before: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(days_used), 0)::BIGINT
            FROM subscription_freeze
            WHERE subscription_number = $1 AND freeze_end IS NOT NULL
            "#,
        )
        .bind(number.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("read freeze usage", e))?;

        let days = freeze.days_to_record(unfreeze_date, locked.freeze_quota, used_before)?;
        let end_date = add_days(locked.end_date, days)
            .ok_or_else(|| DomainError::validation("unfreeze_date", "end_date out of range"))?;

        sqlx::query("UPDATE subscription_freeze SET freeze_end = $2, days_used = $3 WHERE id = $1")
            .bind(freeze.id.as_i64())
            .bind(unfreeze_date)
            .bind(days)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("close freeze", e))?;

        sqlx::query(
            "UPDATE person_subscriptions SET end_date = $2, status = $3 WHERE number = $1",
        )
        .bind(number.as_str())
        .bind(end_date)
        .bind(SubscriptionStatus::Active.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("reactivate subscription", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit unfreeze", e))?;

        freeze.freeze_end = Some(unfreeze_date);
        freeze.days_used = days;
        tracing::debug!(number = %number, days, "Subscription unfrozen");
        Ok(freeze)
    }

    async fn list_active(&self) -> Result<Vec<ActiveFreezeView>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.subscription_number, p.full_name, f.freeze_start, f.freeze_end,
                   f.days_used, f.created_at
            FROM subscription_freeze f
            JOIN person_subscriptions ps ON f.subscription_number = ps.number
            JOIN person p ON ps.person_id = p.id
            WHERE ps.status = 'frozen'
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list active freezes", e))?;

        rows.into_iter()
            .map(|row| {
                let number: String = row.get("subscription_number");
                Ok(ActiveFreezeView {
                    id: corrupt("subscription_freeze.id", FreezeId::new(row.get("id")))?,
                    subscription_number: corrupt(
                        "subscription_number",
                        SubscriptionNumber::new(number),
                    )?,
                    person_name: row.get("full_name"),
                    freeze_start: row.get("freeze_start"),
                    freeze_end: row.get("freeze_end"),
                    days_used: row.get("days_used"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn list_for_subscription(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Vec<SubscriptionFreeze>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, subscription_number, freeze_start, freeze_end, days_used, created_at
            FROM subscription_freeze
            WHERE subscription_number = $1
            ORDER BY freeze_start, id
            "#,
        )
        .bind(number.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list freeze history", e))?;

        rows.into_iter().map(row_to_freeze).collect()
    }
}

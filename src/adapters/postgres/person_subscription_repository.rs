//! PostgreSQL implementation of PersonSubscriptionRepository.
//!
//! Views join `person_subscriptions` with `person` and `subscriptions` and
//! sum the freeze days consumed so far. An open interval counts up to the
//! clock's today, passed as `$1`.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{
    DomainError, ErrorCode, Money, PersonId, PlanId, SubscriptionNumber,
};
use crate::domain::subscription::{PersonSubscription, SubscriptionStatus};
use crate::ports::{
    compare_numbers, Clock, PersonSubscriptionRepository, PersonSubscriptionView,
    StatusSnapshot,
};

use super::errors::{
    corrupt, db_error, from_int4, is_check_violation, is_foreign_key_violation,
    is_unique_violation, parse_status, person_not_found, plan_not_found,
    subscription_not_found,
};

const NUMBER_KEY: &str = "person_subscriptions_pkey";
const PERSON_FKEY: &str = "person_subscriptions_person_id_fkey";
const PLAN_FKEY: &str = "person_subscriptions_subscription_id_fkey";

const VIEW_SELECT: &str = r#"
    SELECT ps.number,
           ps.person_id,
           p.full_name AS person_name,
           ps.subscription_id,
           s.title AS subscription_title,
           ps.subscription_price,
           ps.start_date,
           ps.end_date,
           ps.status,
           ps.discount,
           ps.final_price,
           s.freeze_days,
           COALESCE((
               SELECT SUM(
                   CASE WHEN f.freeze_end IS NULL
                        THEN GREATEST($1::DATE - f.freeze_start, 0)
                        ELSE f.days_used
                   END)
               FROM subscription_freeze f
               WHERE f.subscription_number = ps.number
           ), 0)::BIGINT AS used_freeze_days
    FROM person_subscriptions ps
    JOIN person p ON ps.person_id = p.id
    JOIN subscriptions s ON ps.subscription_id = s.id
"#;

/// PostgreSQL implementation of PersonSubscriptionRepository.
#[derive(Clone)]
pub struct PostgresPersonSubscriptionRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresPersonSubscriptionRepository {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn fetch_views(
        &self,
        filter: &str,
        bind: Option<ViewFilter<'_>>,
        context: &str,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        let sql = format!("{} {}", VIEW_SELECT, filter);
        let mut query = sqlx::query(&sql).bind(self.clock.today());
        query = match bind {
            Some(ViewFilter::Text(value)) => query.bind(value),
            Some(ViewFilter::Id(value)) => query.bind(value),
            None => query,
        };

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error(context, e))?;

        let mut views = rows
            .into_iter()
            .map(row_to_view)
            .collect::<Result<Vec<_>, _>>()?;
        views.sort_by(|a, b| compare_numbers(&a.number, &b.number));
        Ok(views)
    }

    async fn person_exists(&self, condition: &str, bind: ViewFilter<'_>) -> Result<bool, DomainError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM person WHERE {})", condition);
        let query = sqlx::query_scalar::<_, bool>(&sql);
        let query = match bind {
            ViewFilter::Text(value) => query.bind(value.to_string()),
            ViewFilter::Id(value) => query.bind(value),
        };
        query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("check person existence", e))
    }
}

enum ViewFilter<'a> {
    Text(&'a str),
    Id(i64),
}

fn row_to_view(row: sqlx::postgres::PgRow) -> Result<PersonSubscriptionView, DomainError> {
    let number: String = row.get("number");
    let status: String = row.get("status");
    Ok(PersonSubscriptionView {
        number: corrupt("number", SubscriptionNumber::new(number))?,
        person_id: corrupt("person_id", PersonId::new(row.get("person_id")))?,
        person_name: row.get("person_name"),
        subscription_id: corrupt("subscription_id", PlanId::new(row.get("subscription_id")))?,
        subscription_title: row.get("subscription_title"),
        subscription_price: Money::from_minor(row.get("subscription_price")),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: parse_status(&status)?,
        discount: Money::from_minor(row.get("discount")),
        final_price: Money::from_minor(row.get("final_price")),
        freeze_days: from_int4("freeze_days", row.get("freeze_days"))?,
        used_freeze_days: row.get("used_freeze_days"),
    })
}

#[async_trait]
impl PersonSubscriptionRepository for PostgresPersonSubscriptionRepository {
    async fn save(&self, subscription: &PersonSubscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO person_subscriptions (
                number, person_id, subscription_id, subscription_price,
                start_date, end_date, status, discount, final_price
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(subscription.number.as_str())
        .bind(subscription.person_id.as_i64())
        .bind(subscription.plan_id.as_i64())
        .bind(subscription.subscription_price.minor_units())
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.status.as_str())
        .bind(subscription.discount.minor_units())
        .bind(subscription.final_price.minor_units())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, NUMBER_KEY) {
                DomainError::new(
                    ErrorCode::SubscriptionExists,
                    format!("subscription {} already exists", subscription.number),
                )
                .with_detail("number", subscription.number.as_str())
            } else if is_foreign_key_violation(&e, PERSON_FKEY) {
                person_not_found(subscription.person_id)
            } else if is_foreign_key_violation(&e, PLAN_FKEY) {
                plan_not_found(subscription.plan_id)
            } else if is_check_violation(&e) {
                DomainError::validation("person_subscription", e.to_string())
            } else {
                db_error("insert person subscription", e)
            }
        })?;

        Ok(())
    }

    async fn delete(&self, number: &SubscriptionNumber) -> Result<(), DomainError> {
        // Freeze rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM person_subscriptions WHERE number = $1")
            .bind(number.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete person subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(subscription_not_found(number));
        }
        Ok(())
    }

    async fn update_status(
        &self,
        number: &SubscriptionNumber,
        status: SubscriptionStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE person_subscriptions SET status = $2 WHERE number = $1")
            .bind(number.as_str())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update subscription status", e))?;

        if result.rows_affected() == 0 {
            return Err(subscription_not_found(number));
        }
        Ok(())
    }

    async fn find_by_number(
        &self,
        number: &SubscriptionNumber,
    ) -> Result<Option<PersonSubscriptionView>, DomainError> {
        let views = self
            .fetch_views(
                "WHERE ps.number = $2",
                Some(ViewFilter::Text(number.as_str())),
                "fetch person subscription",
            )
            .await?;
        Ok(views.into_iter().next())
    }

    async fn list_all(&self) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        self.fetch_views("", None, "list person subscriptions").await
    }

    async fn find_by_person_name(
        &self,
        full_name: &str,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        if !self
            .person_exists("full_name = $1", ViewFilter::Text(full_name))
            .await?
        {
            return Err(person_not_found(full_name));
        }
        self.fetch_views(
            "WHERE p.full_name = $2",
            Some(ViewFilter::Text(full_name)),
            "fetch subscriptions by person name",
        )
        .await
    }

    async fn find_by_person_id(
        &self,
        person_id: PersonId,
    ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
        if !self
            .person_exists("id = $1", ViewFilter::Id(person_id.as_i64()))
            .await?
        {
            return Err(person_not_found(person_id));
        }
        self.fetch_views(
            "WHERE ps.person_id = $2",
            Some(ViewFilter::Id(person_id.as_i64())),
            "fetch subscriptions by person id",
        )
        .await
    }

    async fn list_status_snapshots(&self) -> Result<Vec<StatusSnapshot>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT ps.number, ps.person_id, p.full_name, ps.start_date, ps.end_date, ps.status,
                   EXISTS(
                       SELECT 1 FROM subscription_freeze f
                       WHERE f.subscription_number = ps.number AND f.freeze_end IS NULL
                   ) AS has_open_freeze
            FROM person_subscriptions ps
            JOIN person p ON ps.person_id = p.id
            ORDER BY ps.number
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list subscription statuses", e))?;

        rows.into_iter()
            .map(|row| {
                let number: String = row.get("number");
                let status: String = row.get("status");
                Ok(StatusSnapshot {
                    number: corrupt("number", SubscriptionNumber::new(number))?,
                    person_id: corrupt("person_id", PersonId::new(row.get("person_id")))?,
                    person_name: row.get("full_name"),
                    start_date: row.get("start_date"),
                    end_date: row.get("end_date"),
                    status: parse_status(&status)?,
                    has_open_freeze: row.get("has_open_freeze"),
                })
            })
            .collect()
    }
}

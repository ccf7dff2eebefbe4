//! PostgreSQL adapters - Database implementations for the storage ports.
//!
//! - `PostgresPersonRepository` - gym members
//! - `PostgresPlanRepository` - subscription plans
//! - `PostgresPersonSubscriptionRepository` - sold subscriptions and views
//! - `PostgresFreezeRepository` - transactional freeze and unfreeze
//! - `PostgresSingleVisitRepository` - single-visit sales
//! - `PostgresStatisticsReader` - aggregate queries
//!
//! Adapters that count open freeze intervals take "today" from the `Clock`
//! port and bind it as a query parameter rather than using `NOW()`.

mod errors;
mod freeze_repository;
mod person_repository;
mod person_subscription_repository;
mod plan_repository;
mod single_visit_repository;
mod statistics_reader;

pub use freeze_repository::PostgresFreezeRepository;
pub use person_repository::PostgresPersonRepository;
pub use person_subscription_repository::PostgresPersonSubscriptionRepository;
pub use plan_repository::PostgresPlanRepository;
pub use single_visit_repository::PostgresSingleVisitRepository;
pub use statistics_reader::PostgresStatisticsReader;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::domain::foundation::DomainError;

/// Opens the connection pool and, when configured, applies `migrations/`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .min_connections(config.min_connections)
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::database(format!("Failed to connect to database: {}", e)))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool established"
    );

    if config.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

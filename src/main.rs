//! gym-membership server binary.
//!
//! Loads configuration, connects PostgreSQL, Redis and the SSO service,
//! starts the daily status refresh and serves the REST API until Ctrl+C or
//! SIGTERM.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use gym_membership::adapters::auth::GrpcIdentityProvider;
use gym_membership::adapters::cache::RedisCache;
use gym_membership::adapters::clock::SystemClock;
use gym_membership::adapters::http::{router, AppState};
use gym_membership::adapters::postgres::{
    self, PostgresFreezeRepository, PostgresPersonRepository,
    PostgresPersonSubscriptionRepository, PostgresPlanRepository,
    PostgresSingleVisitRepository, PostgresStatisticsReader,
};
use gym_membership::adapters::scheduler::DailyStatusRefresh;
use gym_membership::config::{AppConfig, ConfigError, ValidationError};
use gym_membership::domain::foundation::{AuthError, DomainError};
use gym_membership::ports::Clock;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidConfig(#[from] ValidationError),

    #[error("Database: {0}")]
    Database(#[from] DomainError),

    #[error("Redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection timed out")]
    RedisTimeout,

    #[error("SSO client: {0}")]
    Sso(#[from] AuthError),

    #[error("Server: {0}")]
    Io(#[from] std::io::Error),
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .pretty()
            .with_env_filter(filter)
            .init();
    }
}

async fn connect_redis(config: &AppConfig) -> Result<RedisCache, StartupError> {
    let client = redis::Client::open(config.redis.url.as_str())?;
    let conn = tokio::time::timeout(
        config.redis.timeout(),
        client.get_multiplexed_tokio_connection(),
    )
    .await
    .map_err(|_| StartupError::RedisTimeout)??;
    Ok(RedisCache::new(conn))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let pool = postgres::connect(&config.database).await?;
    let cache = connect_redis(&config).await?;
    tracing::info!("Connected to Redis");
    let identity = GrpcIdentityProvider::connect_lazy(&config.sso)?;

    let state = AppState {
        people: Arc::new(PostgresPersonRepository::new(pool.clone())),
        plans: Arc::new(PostgresPlanRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresPersonSubscriptionRepository::new(
            pool.clone(),
            clock.clone(),
        )),
        freezes: Arc::new(PostgresFreezeRepository::new(pool.clone())),
        single_visits: Arc::new(PostgresSingleVisitRepository::new(pool.clone())),
        statistics: Arc::new(PostgresStatisticsReader::new(pool)),
        cache: Arc::new(cache),
        clock,
        identity: Arc::new(identity),
        admin_role: Arc::from(config.sso.admin_role.as_str()),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler = if config.scheduler.enabled {
        let job = DailyStatusRefresh::new(
            state.refresh_statuses_handler(),
            config.scheduler.run_at_time()?,
        );
        Some(tokio::spawn(async move { job.run(shutdown_rx).await }))
    } else {
        tracing::info!("Daily status refresh disabled");
        None
    };

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "Listening");

    let app = router(state, &config.server);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Status refresh task failed");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let config = match AppConfig::load().and_then(|c| {
        c.validate()?;
        Ok(c)
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    init_tracing(&config);

    match run(config).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            std::process::ExitCode::FAILURE
        }
    }
}

//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `GYM` prefix and `__`
//! between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use gym_membership::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod redis;
mod scheduler;
mod server;
mod sso;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use redis::RedisConfig;
pub use scheduler::SchedulerConfig;
pub use server::{Environment, ServerConfig};
pub use sso::SsoConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub redis: RedisConfig,

    /// Identity service used by the auth middleware
    #[serde(default)]
    pub sso: SsoConfig,

    /// Daily status refresh
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (development)
    /// 2. Reads variables with the `GYM` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// # Environment Variable Format
    ///
    /// - `GYM__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `GYM__DATABASE__URL=...` -> `database.url = ...`
    /// - `GYM__SCHEDULER__RUN_AT=03:00` -> `scheduler.run_at = "03:00"`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("GYM")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic validation of every section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.sso.validate()?;
        self.scheduler.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

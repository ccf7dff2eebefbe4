//! SSO (identity service) client configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Connection settings for the gRPC identity service.
#[derive(Debug, Clone, Deserialize)]
pub struct SsoConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after an `Unavailable` response
    #[serde(default = "default_retries")]
    pub retries_count: u32,

    /// Application id this API is registered under
    #[serde(default = "default_app_id")]
    pub app_id: i32,

    /// Role that may call mutating endpoints
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl SsoConfig {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GYM__SSO__HOST"));
        }
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.retries_count > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        if self.admin_role.trim().is_empty() {
            return Err(ValidationError::MissingRequired("GYM__SSO__ADMIN_ROLE"));
        }
        Ok(())
    }
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_secs: default_timeout(),
            retries_count: default_retries(),
            app_id: default_app_id(),
            admin_role: default_admin_role(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    44044
}

fn default_timeout() -> u64 {
    5
}

fn default_retries() -> u32 {
    3
}

fn default_app_id() -> i32 {
    1
}

fn default_admin_role() -> String {
    "admin".to_string()
}

//! Daily status-refresh scheduler configuration

use chrono::NaiveTime;
use serde::Deserialize;

use super::error::ValidationError;

/// When the daily status refresh runs.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Local wall-clock time, `HH:MM`
    #[serde(default = "default_run_at")]
    pub run_at: String,
}

impl SchedulerConfig {
    /// Parsed `run_at`.
    pub fn run_at_time(&self) -> Result<NaiveTime, ValidationError> {
        NaiveTime::parse_from_str(self.run_at.trim(), "%H:%M")
            .map_err(|_| ValidationError::InvalidRunAt(self.run_at.clone()))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.run_at_time().map(|_| ())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            run_at: default_run_at(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_run_at() -> String {
    "00:00".to_string()
}

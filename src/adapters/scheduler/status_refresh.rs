//! DailyStatusRefresh - Background service that keeps subscription statuses
//! in line with the calendar.
//!
//! Sleeps until the next local `run_at` time, runs one refresh pass, logs the
//! outcome and goes back to sleep. A failed pass is not retried the same
//! day; the next tick repairs whatever it missed.
//!
//! ## Graceful Shutdown
//!
//! The service listens on a `watch` channel and stops between runs. A pass
//! already in progress completes first.

use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::sync::watch;
use tokio::time;

use crate::application::{RefreshReport, RefreshStatusesHandler};
use crate::domain::GymError;

/// Time from `now` until the next occurrence of `run_at`. A run time equal
/// to `now` counts as tomorrow's.
pub fn delay_until_next_run(now: NaiveDateTime, run_at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(run_at);
    if next <= now {
        next += chrono::Duration::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::ZERO)
}

/// Daily status refresh job.
pub struct DailyStatusRefresh {
    handler: RefreshStatusesHandler,
    run_at: NaiveTime,
}

impl DailyStatusRefresh {
    pub fn new(handler: RefreshStatusesHandler, run_at: NaiveTime) -> Self {
        Self { handler, run_at }
    }

    /// Run the job loop until a shutdown signal is received.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(run_at = %self.run_at, "Daily status refresh scheduled");

        loop {
            let delay = delay_until_next_run(Local::now().naive_local(), self.run_at);
            tracing::debug!(seconds = delay.as_secs(), "Sleeping until next status refresh");

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Daily status refresh stopped");
                        return;
                    }
                }

                _ = time::sleep(delay) => {
                    // Outcome is logged inside run_once
                    let _ = self.run_once().await;
                }
            }
        }
    }

    /// Run exactly one refresh pass and log its outcome.
    pub async fn run_once(&self) -> Result<RefreshReport, GymError> {
        match self.handler.handle().await {
            Ok(report) => {
                tracing::info!(
                    examined = report.examined,
                    updated = report.updated,
                    "Subscription statuses refreshed"
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscription status refresh failed");
                Err(e)
            }
        }
    }
}

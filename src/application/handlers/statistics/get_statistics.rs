//! GetStatisticsHandler - Cached business statistics.
//!
//! Every figure is cached for 10 minutes under its own key. Ranged figures
//! key on both ends of the range rendered as `YYYY-MM-DD`. Mutating handlers
//! clear all of them through `STATISTICS_FAMILY`.

use std::sync::Arc;

use crate::application::cache::{keys, read_through};
use crate::domain::foundation::Money;
use crate::domain::statistics::{DateRange, MonthlyStat};
use crate::domain::GymError;
use crate::ports::{Cache, StatisticsReader};

/// Query handler for the statistics endpoints.
pub struct GetStatisticsHandler {
    reader: Arc<dyn StatisticsReader>,
    cache: Arc<dyn Cache>,
}

impl GetStatisticsHandler {
    pub fn new(reader: Arc<dyn StatisticsReader>, cache: Arc<dyn Cache>) -> Self {
        Self { reader, cache }
    }

    pub async fn total_clients(&self) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::STAT_TOTAL_CLIENTS,
            keys::STATISTICS_TTL,
            || async { self.reader.total_clients().await.map_err(GymError::from) },
        )
        .await
    }

    /// Distinct people whose subscription starts within `range`.
    pub async fn new_clients(&self, range: &DateRange) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::stat_new_clients(range),
            keys::STATISTICS_TTL,
            || async { self.reader.new_clients(range).await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn total_income(&self) -> Result<Money, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::STAT_TOTAL_INCOME,
            keys::STATISTICS_TTL,
            || async { self.reader.total_income().await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn income(&self, range: &DateRange) -> Result<Money, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::stat_income(range),
            keys::STATISTICS_TTL,
            || async { self.reader.income(range).await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn total_sold_subscriptions(&self) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::STAT_TOTAL_SOLD_SUBSCRIPTIONS,
            keys::STATISTICS_TTL,
            || async {
                self.reader
                    .total_sold_subscriptions()
                    .await
                    .map_err(GymError::from)
            },
        )
        .await
    }

    pub async fn sold_subscriptions(&self, range: &DateRange) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::stat_sold_subscriptions(range),
            keys::STATISTICS_TTL,
            || async {
                self.reader
                    .sold_subscriptions(range)
                    .await
                    .map_err(GymError::from)
            },
        )
        .await
    }

    pub async fn total_single_visits(&self) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::STAT_TOTAL_SINGLE_VISITS,
            keys::STATISTICS_TTL,
            || async { self.reader.total_single_visits().await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn single_visits(&self, range: &DateRange) -> Result<i64, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::stat_single_visits(range),
            keys::STATISTICS_TTL,
            || async { self.reader.single_visits(range).await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn single_visits_income(&self) -> Result<Money, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::STAT_SINGLE_VISITS_INCOME,
            keys::STATISTICS_TTL,
            || async { self.reader.single_visits_income().await.map_err(GymError::from) },
        )
        .await
    }

    /// One row per calendar month of `range`, zero rows included.
    pub async fn monthly(&self, range: &DateRange) -> Result<Vec<MonthlyStat>, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::stat_monthly(range),
            keys::STATISTICS_TTL,
            || async {
                let subscriptions = self.reader.monthly_subscription_totals(range).await?;
                let visits = self.reader.monthly_visit_totals(range).await?;
                Ok::<_, GymError>(MonthlyStat::rollup(range, &subscriptions, &visits))
            },
        )
        .await
    }
}

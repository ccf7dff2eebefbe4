//! Single-visit handlers.
//!
//! Visits are independent of subscriptions. Mutations clear the visit
//! caches and the statistics family.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::cache::{keys, read_through, CacheInvalidator};
use crate::domain::foundation::SingleVisitId;
use crate::domain::statistics::DateRange;
use crate::domain::visits::{SingleVisit, SingleVisitDetails};
use crate::domain::GymError;
use crate::ports::{Cache, SingleVisitRepository};

/// Command to record a one-off visit sale.
#[derive(Debug, Clone)]
pub struct AddSingleVisitCommand {
    /// `YYYY-MM-DD`, required.
    pub visit_date: Option<String>,
    pub final_price: i64,
}

/// Record and delete single visits.
pub struct SingleVisitCommandsHandler {
    visits: Arc<dyn SingleVisitRepository>,
    invalidator: CacheInvalidator,
}

impl SingleVisitCommandsHandler {
    pub fn new(visits: Arc<dyn SingleVisitRepository>, cache: Arc<dyn Cache>) -> Self {
        Self {
            visits,
            invalidator: CacheInvalidator::new(cache),
        }
    }

    pub async fn add(&self, cmd: AddSingleVisitCommand) -> Result<SingleVisitId, GymError> {
        let details = SingleVisitDetails::new(cmd.visit_date.as_deref(), cmd.final_price)?;
        let id = self.visits.save(&details).await?;
        tracing::info!(visit_id = %id, visit_date = %details.visit_date, "Single visit added");
        self.invalidate().await;
        Ok(id)
    }

    /// # Errors
    ///
    /// `SingleVisitNotFound` when no visit has this id.
    pub async fn delete(&self, id: SingleVisitId) -> Result<(), GymError> {
        self.visits.delete(id).await?;
        tracing::info!(visit_id = %id, "Single visit deleted");
        self.invalidate().await;
        Ok(())
    }

    async fn invalidate(&self) {
        self.invalidator
            .delete_prefix(keys::SINGLE_VISITS_PREFIX)
            .await;
        self.invalidator.statistics().await;
    }
}

/// Cached single-visit lookups.
pub struct SingleVisitQueries {
    visits: Arc<dyn SingleVisitRepository>,
    cache: Arc<dyn Cache>,
}

impl SingleVisitQueries {
    pub fn new(visits: Arc<dyn SingleVisitRepository>, cache: Arc<dyn Cache>) -> Self {
        Self { visits, cache }
    }

    pub async fn all(&self) -> Result<Vec<SingleVisit>, GymError> {
        read_through(
            self.cache.as_ref(),
            keys::SINGLE_VISITS_ALL,
            keys::LIST_TTL,
            || async { self.visits.list_all().await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn by_id(&self, id: SingleVisitId) -> Result<SingleVisit, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::single_visit_by_id(id),
            keys::LIST_TTL,
            || async {
                self.visits
                    .find_by_id(id)
                    .await
                    .map_err(GymError::from)?
                    .ok_or_else(|| GymError::SingleVisitNotFound(id.to_string()))
            },
        )
        .await
    }

    pub async fn by_day(&self, day: NaiveDate) -> Result<Vec<SingleVisit>, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::single_visits_by_day(day),
            keys::LIST_TTL,
            || async { self.visits.list_by_day(day).await.map_err(GymError::from) },
        )
        .await
    }

    pub async fn by_period(&self, range: &DateRange) -> Result<Vec<SingleVisit>, GymError> {
        read_through(
            self.cache.as_ref(),
            &keys::single_visits_by_period(range),
            keys::LIST_TTL,
            || async { self.visits.list_by_period(range).await.map_err(GymError::from) },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCache;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::Money;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (SingleVisitCommandsHandler, SingleVisitQueries, Arc<InMemoryCache>) {
        let store = Arc::new(InMemoryStore::new(Arc::new(FixedClock::new(date(2024, 6, 1)))));
        let cache = Arc::new(InMemoryCache::new());
        (
            SingleVisitCommandsHandler::new(store.clone(), cache.clone()),
            SingleVisitQueries::new(store, cache.clone()),
            cache,
        )
    }

    fn visit(day: &str, price: i64) -> AddSingleVisitCommand {
        AddSingleVisitCommand {
            visit_date: Some(day.to_string()),
            final_price: price,
        }
    }

    #[tokio::test]
    async fn add_makes_new_visit_visible_in_cached_lists() {
        let (commands, queries, _) = setup();
        commands.add(visit("2024-06-01", 300)).await.unwrap();
        assert_eq!(queries.by_day(date(2024, 6, 1)).await.unwrap().len(), 1);

        commands.add(visit("2024-06-01", 300)).await.unwrap();

        assert_eq!(queries.by_day(date(2024, 6, 1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn period_is_inclusive() {
        let (commands, queries, _) = setup();
        for day in ["2024-05-31", "2024-06-01", "2024-06-30", "2024-07-01"] {
            commands.add(visit(day, 300)).await.unwrap();
        }
        let june = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();

        let found = queries.by_period(&june).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].visit_date, date(2024, 6, 30));
        assert_eq!(found[1].final_price, Money::from_minor(300));
    }

    #[tokio::test]
    async fn missing_visit_is_not_found_for_read_and_delete() {
        let (commands, queries, _) = setup();
        let id = SingleVisitId::new(77).unwrap();

        assert_eq!(
            queries.by_id(id).await.unwrap_err(),
            GymError::SingleVisitNotFound("77".to_string())
        );
        assert_eq!(
            commands.delete(id).await.unwrap_err(),
            GymError::SingleVisitNotFound("77".to_string())
        );
    }

    #[tokio::test]
    async fn mutation_clears_single_visit_statistics() {
        let (commands, _, cache) = setup();
        for key in [
            "stat:total_single_visits",
            "stat:single_visits_income",
            "stat:single_visits:2024-06-01:2024-06-30",
        ] {
            cache.set(key, b"0", Duration::from_secs(600)).await.unwrap();
        }

        commands.add(visit("2024-06-02", 300)).await.unwrap();

        assert!(cache.keys().await.is_empty());
    }

    #[tokio::test]
    async fn missing_date_is_rejected() {
        let (commands, _, _) = setup();

        let err = commands
            .add(AddSingleVisitCommand {
                visit_date: None,
                final_price: 300,
            })
            .await
            .unwrap_err();

        assert!(err.fields().unwrap().contains("visit_date"));
    }
}

//! RefreshStatusesHandler - Daily recomputation of subscription statuses.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::application::cache::{keys, CacheInvalidator};
use crate::domain::foundation::{PersonId, StateMachine, SubscriptionNumber};
use crate::domain::subscription::SubscriptionStatus;
use crate::domain::GymError;
use crate::ports::{Cache, Clock, PersonSubscriptionRepository};

/// Outcome of one refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshReport {
    /// Subscriptions looked at.
    pub examined: usize,
    /// Subscriptions whose stored status changed.
    pub updated: usize,
}

/// Handler that brings every stored status in line with today's date.
///
/// One full scan per call; only rows whose status changes are written, so a
/// second run on the same day writes nothing. Closed subscriptions are left
/// alone and an open freeze keeps a subscription frozen.
pub struct RefreshStatusesHandler {
    subscriptions: Arc<dyn PersonSubscriptionRepository>,
    invalidator: CacheInvalidator,
    clock: Arc<dyn Clock>,
}

impl RefreshStatusesHandler {
    pub fn new(
        subscriptions: Arc<dyn PersonSubscriptionRepository>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            invalidator: CacheInvalidator::new(cache),
            clock,
        }
    }

    /// # Errors
    ///
    /// The first failed write stops the pass and is returned. Caches of rows
    /// written before it are still invalidated.
    pub async fn handle(&self) -> Result<RefreshReport, GymError> {
        let today = self.clock.today();
        let snapshots = self.subscriptions.list_status_snapshots().await?;

        let mut report = RefreshReport {
            examined: snapshots.len(),
            updated: 0,
        };
        let mut touched: Vec<(SubscriptionNumber, String, PersonId)> = Vec::new();
        let mut failure = None;

        for snapshot in snapshots {
            let target = SubscriptionStatus::refreshed(
                snapshot.status,
                snapshot.start_date,
                snapshot.end_date,
                today,
                snapshot.has_open_freeze,
            );
            if target == snapshot.status {
                continue;
            }
            if let Err(e) = snapshot.status.transition_to(target) {
                tracing::warn!(number = %snapshot.number, error = %e, "Skipping status change");
                continue;
            }

            match self
                .subscriptions
                .update_status(&snapshot.number, target)
                .await
            {
                Ok(()) => {
                    tracing::debug!(
                        number = %snapshot.number,
                        from = %snapshot.status,
                        to = %target,
                        "Subscription status refreshed"
                    );
                    report.updated += 1;
                    touched.push((snapshot.number, snapshot.person_name, snapshot.person_id));
                }
                Err(e) => {
                    tracing::error!(number = %snapshot.number, error = %e, "Status update failed");
                    failure = Some(e);
                    break;
                }
            }
        }

        self.invalidate(&touched).await;

        match failure {
            Some(e) => Err(e.into()),
            None => Ok(report),
        }
    }

    async fn invalidate(&self, touched: &[(SubscriptionNumber, String, PersonId)]) {
        let mut names = BTreeSet::new();
        let mut people = BTreeSet::new();
        for (number, name, person_id) in touched {
            self.invalidator
                .delete(&keys::person_sub_by_number(number))
                .await;
            names.insert(name.as_str());
            people.insert(*person_id);
        }
        for name in names {
            self.invalidator.delete(&keys::person_subs_by_name(name)).await;
        }
        for person_id in people {
            self.invalidator
                .delete(&keys::person_subs_by_person_id(person_id))
                .await;
        }

        self.invalidator.delete(keys::PERSON_SUBS_ALL).await;
        self.invalidator.delete(keys::ACTIVE_FREEZES).await;
        self.invalidator.statistics().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCache;
    use crate::adapters::clock::FixedClock;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::domain::subscription::PersonSubscription;
    use crate::ports::{PersonSubscriptionView, StatusSnapshot};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 15)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockRepository {
        rows: Mutex<Vec<StatusSnapshot>>,
        writes: Mutex<Vec<(String, SubscriptionStatus)>>,
        fail_on: Option<&'static str>,
    }

    impl MockRepository {
        fn new(rows: Vec<StatusSnapshot>) -> Self {
            Self {
                rows: Mutex::new(rows),
                writes: Mutex::new(vec![]),
                fail_on: None,
            }
        }

        fn failing_on(rows: Vec<StatusSnapshot>, number: &'static str) -> Self {
            Self {
                fail_on: Some(number),
                ..Self::new(rows)
            }
        }

        fn writes(&self) -> Vec<(String, SubscriptionStatus)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PersonSubscriptionRepository for MockRepository {
        async fn save(&self, _subscription: &PersonSubscription) -> Result<(), DomainError> {
            Ok(())
        }

        async fn delete(&self, _number: &SubscriptionNumber) -> Result<(), DomainError> {
            Ok(())
        }

        async fn update_status(
            &self,
            number: &SubscriptionNumber,
            status: SubscriptionStatus,
        ) -> Result<(), DomainError> {
            if self.fail_on == Some(number.as_str()) {
                return Err(DomainError::new(ErrorCode::DatabaseError, "Simulated failure"));
            }
            self.writes
                .lock()
                .unwrap()
                .push((number.to_string(), status));
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| &r.number == number) {
                row.status = status;
            }
            Ok(())
        }

        async fn find_by_number(
            &self,
            _number: &SubscriptionNumber,
        ) -> Result<Option<PersonSubscriptionView>, DomainError> {
            Ok(None)
        }

        async fn list_all(&self) -> Result<Vec<PersonSubscriptionView>, DomainError> {
            Ok(vec![])
        }

        async fn find_by_person_name(
            &self,
            _full_name: &str,
        ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
            Ok(vec![])
        }

        async fn find_by_person_id(
            &self,
            _person_id: PersonId,
        ) -> Result<Vec<PersonSubscriptionView>, DomainError> {
            Ok(vec![])
        }

        async fn list_status_snapshots(&self) -> Result<Vec<StatusSnapshot>, DomainError> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    fn row(
        number: &str,
        start: NaiveDate,
        end: NaiveDate,
        status: SubscriptionStatus,
    ) -> StatusSnapshot {
        StatusSnapshot {
            number: SubscriptionNumber::new(number).unwrap(),
            person_id: PersonId::new(1).unwrap(),
            person_name: "John Doe".to_string(),
            start_date: start,
            end_date: end,
            status,
            has_open_freeze: false,
        }
    }

    fn handler(repo: Arc<MockRepository>, cache: Arc<InMemoryCache>) -> RefreshStatusesHandler {
        RefreshStatusesHandler::new(repo, cache, Arc::new(FixedClock::new(today())))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn applies_the_date_rule_and_writes_only_changes() {
        use SubscriptionStatus::*;
        let repo = Arc::new(MockRepository::new(vec![
            row("1", date(2024, 6, 1), date(2024, 7, 1), Active),
            row("2", date(2024, 7, 1), date(2024, 8, 1), Active),
            row("3", date(2024, 5, 1), date(2024, 6, 14), Active),
            row("4", date(2024, 6, 15), date(2024, 6, 15), Expired),
        ]));

        let report = handler(repo.clone(), Arc::new(InMemoryCache::new()))
            .handle()
            .await
            .unwrap();

        assert_eq!(report, RefreshReport { examined: 4, updated: 3 });
        assert_eq!(
            repo.writes(),
            vec![
                ("2".to_string(), Frozen),
                ("3".to_string(), Expired),
                ("4".to_string(), Active),
            ]
        );
    }

    #[tokio::test]
    async fn second_run_writes_nothing() {
        use SubscriptionStatus::*;
        let repo = Arc::new(MockRepository::new(vec![
            row("1", date(2024, 7, 1), date(2024, 8, 1), Active),
            row("2", date(2024, 1, 1), date(2024, 2, 1), Active),
        ]));
        let handler = handler(repo.clone(), Arc::new(InMemoryCache::new()));

        handler.handle().await.unwrap();
        let second = handler.handle().await.unwrap();

        assert_eq!(second.updated, 0);
        assert_eq!(repo.writes().len(), 2);
    }

    #[tokio::test]
    async fn closed_and_open_freeze_rows_are_kept() {
        use SubscriptionStatus::*;
        let mut frozen = row("2", date(2024, 6, 1), date(2024, 7, 1), Frozen);
        frozen.has_open_freeze = true;
        let repo = Arc::new(MockRepository::new(vec![
            row("1", date(2024, 1, 1), date(2024, 2, 1), Closed),
            frozen,
        ]));

        let report = handler(repo.clone(), Arc::new(InMemoryCache::new()))
            .handle()
            .await
            .unwrap();

        assert_eq!(report.updated, 0);
        assert!(repo.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_write_stops_pass_but_invalidates_caches() {
        use SubscriptionStatus::*;
        let repo = Arc::new(MockRepository::failing_on(
            vec![
                row("1", date(2024, 1, 1), date(2024, 2, 1), Active),
                row("2", date(2024, 1, 1), date(2024, 2, 1), Active),
                row("3", date(2024, 1, 1), date(2024, 2, 1), Active),
            ],
            "2",
        ));
        let cache = Arc::new(InMemoryCache::new());
        for key in ["person_sub:number:1", "person_subs:all", "stat:total_income"] {
            cache.set(key, b"x", Duration::from_secs(600)).await.unwrap();
        }

        let err = handler(repo.clone(), cache.clone()).handle().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(repo.writes(), vec![("1".to_string(), Expired)]);
        assert!(cache.keys().await.is_empty());
    }
}

//! AddPersonSubscriptionHandler - Command handler for selling a subscription.

use std::sync::Arc;

use crate::application::cache::{keys, CacheInvalidator};
use crate::domain::foundation::SubscriptionNumber;
use crate::domain::subscription::PersonSubscriptionDraft;
use crate::domain::GymError;
use crate::ports::{Cache, Clock, PersonRepository, PersonSubscriptionRepository, PlanRepository};

/// Command to register a subscription for a person.
#[derive(Debug, Clone)]
pub struct AddPersonSubscriptionCommand {
    pub draft: PersonSubscriptionDraft,
}

/// Handler for selling subscriptions.
///
/// Defaults missing dates and prices from the plan, derives the initial
/// status from the calendar and stores the row. Storage decides uniqueness
/// of the number and existence of the person.
pub struct AddPersonSubscriptionHandler {
    subscriptions: Arc<dyn PersonSubscriptionRepository>,
    plans: Arc<dyn PlanRepository>,
    people: Arc<dyn PersonRepository>,
    invalidator: CacheInvalidator,
    clock: Arc<dyn Clock>,
}

impl AddPersonSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn PersonSubscriptionRepository>,
        plans: Arc<dyn PlanRepository>,
        people: Arc<dyn PersonRepository>,
        cache: Arc<dyn Cache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            people,
            invalidator: CacheInvalidator::new(cache),
            clock,
        }
    }

    pub async fn handle(
        &self,
        cmd: AddPersonSubscriptionCommand,
    ) -> Result<SubscriptionNumber, GymError> {
        // 1. Validate every field up front
        let draft = cmd.draft.validate()?;

        // 2. Resolve the plan for defaults
        let plan = self
            .plans
            .find_by_id(draft.plan_id)
            .await?
            .ok_or_else(|| GymError::PlanNotFound(draft.plan_id.to_string()))?;

        // 3. Build the row
        let person_id = draft.person_id;
        let subscription = draft.into_subscription(&plan, self.clock.today())?;

        // 4. Persist; storage reports a taken number or a missing person
        self.subscriptions.save(&subscription).await?;

        tracing::info!(
            number = %subscription.number,
            person_id = %person_id,
            status = %subscription.status,
            "Person subscription added"
        );

        // 5. Invalidate everything the new row can stale
        let owner = match self.people.find_by_id(person_id).await {
            Ok(owner) => owner,
            Err(e) => {
                tracing::warn!(person_id = %person_id, error = %e, "Owner lookup failed");
                None
            }
        };
        self.invalidator
            .delete(&keys::person_sub_by_number(&subscription.number))
            .await;
        if let Some(owner) = owner {
            self.invalidator
                .delete(&keys::person_subs_by_name(&owner.full_name))
                .await;
        }
        self.invalidator
            .delete(&keys::person_subs_by_person_id(person_id))
            .await;
        self.invalidator.delete(keys::PERSON_SUBS_ALL).await;
        self.invalidator.delete(keys::ACTIVE_FREEZES).await;
        self.invalidator.statistics().await;

        Ok(subscription.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::InMemoryCache;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::foundation::{ErrorCode, Money, PersonId, PlanId};
    use crate::domain::people::PersonDetails;
    use crate::domain::plans::PlanDetails;
    use crate::domain::subscription::SubscriptionStatus;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    struct Fixture {
        handler: AddPersonSubscriptionHandler,
        store: InMemoryStore,
        cache: Arc<InMemoryCache>,
        person: PersonId,
        plan: PlanId,
    }

    async fn fixture() -> Fixture {
        let clock = Arc::new(FixedClock::new(today()));
        let store = InMemoryStore::new(clock.clone());
        let cache = Arc::new(InMemoryCache::new());
        let person = PersonRepository::save(
            &store,
            &PersonDetails::new("John Doe", "+7 900 000-00-01").unwrap(),
        )
        .await
        .unwrap();
        let plan = PlanRepository::save(&store, &PlanDetails::new("Monthly", 1_000, 30, 5).unwrap())
            .await
            .unwrap();
        let shared = Arc::new(store.clone());
        let handler = AddPersonSubscriptionHandler::new(
            shared.clone(),
            shared.clone(),
            shared,
            cache.clone(),
            clock,
        );
        Fixture {
            handler,
            store,
            cache,
            person,
            plan,
        }
    }

    fn draft(f: &Fixture, number: &str) -> PersonSubscriptionDraft {
        PersonSubscriptionDraft {
            number: number.to_string(),
            person_id: Some(f.person.as_i64()),
            subscription_id: Some(f.plan.as_i64()),
            ..Default::default()
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn defaults_come_from_plan_and_today() {
        let f = fixture().await;

        let number = f
            .handler
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft {
                    discount: Some(200),
                    ..draft(&f, "1001")
                },
            })
            .await
            .unwrap();

        let view = f.store.find_by_number(&number).await.unwrap().unwrap();
        assert_eq!(view.start_date, today());
        assert_eq!(view.end_date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(view.subscription_price, Money::from_minor(1_000));
        assert_eq!(view.final_price, Money::from_minor(800));
        assert_eq!(view.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn future_start_is_stored_frozen() {
        let f = fixture().await;

        let number = f
            .handler
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft {
                    start_date: Some("2024-06-10".to_string()),
                    ..draft(&f, "1002")
                },
            })
            .await
            .unwrap();

        let view = f.store.find_by_number(&number).await.unwrap().unwrap();
        assert_eq!(view.status, SubscriptionStatus::Frozen);
    }

    #[tokio::test]
    async fn clears_subscription_and_statistics_caches() {
        let f = fixture().await;
        let ttl = Duration::from_secs(600);
        for key in [
            "person_subs:all",
            "person_sub:person:John Doe",
            "stat:total_income",
            "stat:income:2024-01-01:2024-12-31",
            "people:all",
        ] {
            f.cache.set(key, b"[]", ttl).await.unwrap();
        }

        f.handler
            .handle(AddPersonSubscriptionCommand {
                draft: draft(&f, "1001"),
            })
            .await
            .unwrap();

        assert_eq!(f.cache.keys().await, vec!["people:all"]);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn reports_every_missing_field() {
        let f = fixture().await;

        let err = f
            .handler
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft::default(),
            })
            .await
            .unwrap_err();

        let fields = err.fields().expect("validation error");
        assert!(fields.contains("number"));
        assert!(fields.contains("person_id"));
        assert!(fields.contains("subscription_id"));
    }

    #[tokio::test]
    async fn taken_number_is_a_conflict() {
        let f = fixture().await;
        let cmd = AddPersonSubscriptionCommand {
            draft: draft(&f, "1001"),
        };
        f.handler.handle(cmd.clone()).await.unwrap();

        let err = f.handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, GymError::SubscriptionExists("1001".to_string()));
    }

    #[tokio::test]
    async fn unknown_person_is_not_found() {
        let f = fixture().await;

        let err = f
            .handler
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft {
                    person_id: Some(404),
                    ..draft(&f, "1001")
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::PersonNotFound);
        assert_eq!(f.store.subscription_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_plan_is_not_found() {
        let f = fixture().await;

        let err = f
            .handler
            .handle(AddPersonSubscriptionCommand {
                draft: PersonSubscriptionDraft {
                    subscription_id: Some(404),
                    ..draft(&f, "1001")
                },
            })
            .await
            .unwrap_err();

        assert_eq!(err, GymError::PlanNotFound("404".to_string()));
    }
}

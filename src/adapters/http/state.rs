//! Shared application state for the HTTP surface.

use std::sync::Arc;

use crate::adapters::cache::InMemoryCache;
use crate::adapters::memory::InMemoryStore;
use crate::application::handlers::{
    AddPersonHandler, AddPersonSubscriptionHandler, DeletePersonHandler,
    DeletePersonSubscriptionHandler, FreezeSubscriptionHandler, GetPersonSubscriptionsHandler,
    GetStatisticsHandler, ListFreezesHandler, PeopleQueries, PlanCommandsHandler, PlanQueries,
    RefreshStatusesHandler, SingleVisitCommandsHandler, SingleVisitQueries, UnfreezeSubscriptionHandler,
    UpdatePersonHandler,
};
use crate::ports::{
    Cache, Clock, FreezeRepository, IdentityProvider, PersonRepository,
    PersonSubscriptionRepository, PlanRepository, SingleVisitRepository, StatisticsReader,
};

/// Dependencies shared by every request.
///
/// Cloned per request; every field is an `Arc`. Handlers are built on
/// demand from these ports.
#[derive(Clone)]
pub struct AppState {
    pub people: Arc<dyn PersonRepository>,
    pub plans: Arc<dyn PlanRepository>,
    pub subscriptions: Arc<dyn PersonSubscriptionRepository>,
    pub freezes: Arc<dyn FreezeRepository>,
    pub single_visits: Arc<dyn SingleVisitRepository>,
    pub statistics: Arc<dyn StatisticsReader>,
    pub cache: Arc<dyn Cache>,
    pub clock: Arc<dyn Clock>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Role required by mutating routes.
    pub admin_role: Arc<str>,
}

impl AppState {
    /// State backed by the in-memory store and cache.
    pub fn in_memory(
        identity: Arc<dyn IdentityProvider>,
        clock: Arc<dyn Clock>,
        admin_role: &str,
    ) -> Self {
        let store = Arc::new(InMemoryStore::new(clock.clone()));
        Self {
            people: store.clone(),
            plans: store.clone(),
            subscriptions: store.clone(),
            freezes: store.clone(),
            single_visits: store.clone(),
            statistics: store,
            cache: Arc::new(InMemoryCache::new()),
            clock,
            identity,
            admin_role: Arc::from(admin_role),
        }
    }

    // People

    pub fn people_queries(&self) -> PeopleQueries {
        PeopleQueries::new(self.people.clone(), self.cache.clone())
    }

    pub fn add_person_handler(&self) -> AddPersonHandler {
        AddPersonHandler::new(self.people.clone(), self.cache.clone())
    }

    pub fn update_person_handler(&self) -> UpdatePersonHandler {
        UpdatePersonHandler::new(self.people.clone(), self.cache.clone())
    }

    pub fn delete_person_handler(&self) -> DeletePersonHandler {
        DeletePersonHandler::new(self.people.clone(), self.cache.clone())
    }

    // Plans

    pub fn plan_queries(&self) -> PlanQueries {
        PlanQueries::new(self.plans.clone(), self.cache.clone())
    }

    pub fn plan_commands(&self) -> PlanCommandsHandler {
        PlanCommandsHandler::new(self.plans.clone(), self.cache.clone())
    }

    // Person subscriptions

    pub fn person_subscription_queries(&self) -> GetPersonSubscriptionsHandler {
        GetPersonSubscriptionsHandler::new(self.subscriptions.clone(), self.cache.clone())
    }

    pub fn add_person_subscription_handler(&self) -> AddPersonSubscriptionHandler {
        AddPersonSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.plans.clone(),
            self.people.clone(),
            self.cache.clone(),
            self.clock.clone(),
        )
    }

    pub fn delete_person_subscription_handler(&self) -> DeletePersonSubscriptionHandler {
        DeletePersonSubscriptionHandler::new(self.subscriptions.clone(), self.cache.clone())
    }

    // Freezes

    pub fn freeze_handler(&self) -> FreezeSubscriptionHandler {
        FreezeSubscriptionHandler::new(
            self.freezes.clone(),
            self.cache.clone(),
            self.clock.clone(),
        )
    }

    pub fn unfreeze_handler(&self) -> UnfreezeSubscriptionHandler {
        UnfreezeSubscriptionHandler::new(
            self.freezes.clone(),
            self.cache.clone(),
            self.clock.clone(),
        )
    }

    pub fn list_freezes_handler(&self) -> ListFreezesHandler {
        ListFreezesHandler::new(
            self.freezes.clone(),
            self.subscriptions.clone(),
            self.cache.clone(),
        )
    }

    pub fn refresh_statuses_handler(&self) -> RefreshStatusesHandler {
        RefreshStatusesHandler::new(
            self.subscriptions.clone(),
            self.cache.clone(),
            self.clock.clone(),
        )
    }

    // Single visits

    pub fn single_visit_queries(&self) -> SingleVisitQueries {
        SingleVisitQueries::new(self.single_visits.clone(), self.cache.clone())
    }

    pub fn single_visit_commands(&self) -> SingleVisitCommandsHandler {
        SingleVisitCommandsHandler::new(self.single_visits.clone(), self.cache.clone())
    }

    // Statistics

    pub fn statistics_handler(&self) -> GetStatisticsHandler {
        GetStatisticsHandler::new(self.statistics.clone(), self.cache.clone())
    }
}

//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod freeze;
pub mod people;
pub mod person_subscription;
pub mod plans;
pub mod single_visits;
pub mod statistics;

pub use freeze::{
    FreezeSubscriptionCommand, FreezeSubscriptionHandler, ListFreezesHandler,
    UnfreezeSubscriptionCommand, UnfreezeSubscriptionHandler,
};
pub use people::{
    AddPersonCommand, AddPersonHandler, DeletePersonHandler, PeopleQueries, UpdatePersonCommand,
    UpdatePersonHandler,
};
pub use person_subscription::{
    AddPersonSubscriptionCommand, AddPersonSubscriptionHandler, DeletePersonSubscriptionCommand,
    DeletePersonSubscriptionHandler, GetPersonSubscriptionsHandler, RefreshReport,
    RefreshStatusesHandler,
};
pub use plans::{PlanCommand, PlanCommandsHandler, PlanQueries};
pub use single_visits::{AddSingleVisitCommand, SingleVisitCommandsHandler, SingleVisitQueries};
pub use statistics::GetStatisticsHandler;

//! Person-subscription lifecycle handlers.
//!
//! - `AddPersonSubscriptionHandler` - sell a subscription
//! - `DeletePersonSubscriptionHandler` - remove one with its freeze history
//! - `GetPersonSubscriptionsHandler` - cached lookups
//! - `RefreshStatusesHandler` - the daily status pass

mod add_person_subscription;
mod delete_person_subscription;
mod get_person_subscriptions;
mod refresh_statuses;

pub use add_person_subscription::{AddPersonSubscriptionCommand, AddPersonSubscriptionHandler};
pub use delete_person_subscription::{
    DeletePersonSubscriptionCommand, DeletePersonSubscriptionHandler,
};
pub use get_person_subscriptions::GetPersonSubscriptionsHandler;
pub use refresh_statuses::{RefreshReport, RefreshStatusesHandler};

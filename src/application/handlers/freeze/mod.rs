//! Subscription-freeze handlers.

mod freeze_subscription;
mod list_freezes;
mod unfreeze_subscription;

pub use freeze_subscription::{FreezeSubscriptionCommand, FreezeSubscriptionHandler};
pub use list_freezes::ListFreezesHandler;
pub use unfreeze_subscription::{UnfreezeSubscriptionCommand, UnfreezeSubscriptionHandler};

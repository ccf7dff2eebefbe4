//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers write through storage and then invalidate the caches the
//! write can have staled; query handlers read through the cache.

pub mod cache;
pub mod handlers;

pub use handlers::{
    // Person subscriptions
    AddPersonSubscriptionCommand, AddPersonSubscriptionHandler, DeletePersonSubscriptionCommand,
    DeletePersonSubscriptionHandler, GetPersonSubscriptionsHandler, RefreshReport,
    RefreshStatusesHandler,
    // Freezes
    FreezeSubscriptionCommand, FreezeSubscriptionHandler, ListFreezesHandler,
    UnfreezeSubscriptionCommand, UnfreezeSubscriptionHandler,
    // Statistics
    GetStatisticsHandler,
};

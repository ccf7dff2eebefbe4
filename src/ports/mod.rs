//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `PersonRepository`, `PlanRepository` - member and plan records
//! - `PersonSubscriptionRepository` - sold subscriptions and their views
//! - `FreezeRepository` - transactional freeze and unfreeze
//! - `SingleVisitRepository` - one-off visit sales
//! - `StatisticsReader` - aggregate queries
//!
//! ## Infrastructure Ports
//!
//! - `Cache` - key-value cache with TTL and prefix deletion
//! - `IdentityProvider` - external SSO service
//! - `Clock` - the business date

mod cache;
mod clock;
mod freeze_repository;
mod identity_provider;
mod person_repository;
mod person_subscription_repository;
mod plan_repository;
mod single_visit_repository;
mod statistics_reader;

pub use cache::Cache;
pub use clock::Clock;
pub use freeze_repository::{ActiveFreezeView, FreezeRepository};
pub use identity_provider::{IdentityProvider, TokenCheck};
pub use person_repository::PersonRepository;
pub use person_subscription_repository::{
    compare_numbers, PersonSubscriptionRepository, PersonSubscriptionView, StatusSnapshot,
};
pub use plan_repository::PlanRepository;
pub use single_visit_repository::SingleVisitRepository;
pub use statistics_reader::StatisticsReader;

//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - SSO identity provider (gRPC client, mock)
//! - `cache` - cache implementations (in-memory, Redis)
//! - `clock` - system and fixed clocks
//! - `http` - axum REST surface
//! - `memory` - in-memory storage for every repository port
//! - `postgres` - PostgreSQL storage
//! - `scheduler` - daily status refresh

pub mod auth;
pub mod cache;
pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod scheduler;

pub use auth::{GrpcIdentityProvider, MockIdentityProvider};
pub use cache::{InMemoryCache, RedisCache};
pub use clock::{FixedClock, SystemClock};
pub use memory::InMemoryStore;
pub use scheduler::DailyStatusRefresh;

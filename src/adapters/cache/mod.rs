//! Cache adapters.
//!
//! Implementations of the `Cache` port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryCache` - process-local map, for tests and single-node runs
//! - `RedisCache` - Redis-backed, shared by every API instance
//!
//! ## Usage
//!
//! ```ignore
//! use gym_membership::adapters::cache::{InMemoryCache, RedisCache};
//!
//! // For testing
//! let cache = InMemoryCache::new();
//!
//! // For production
//! let cache = RedisCache::new(redis_connection);
//! ```

mod in_memory;
mod redis;

pub use in_memory::InMemoryCache;
pub use redis::RedisCache;

//! Gym Membership - subscription lifecycle backend for a fitness club.
//!
//! Tracks members, subscription plans, sold subscriptions with their status
//! and freeze intervals, and single-visit sales; answers business statistics
//! through a read-through cache that every write invalidates.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

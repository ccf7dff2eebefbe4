//! Person-subscription domain module.
//!
//! # Module Structure
//!
//! - `status` - SubscriptionStatus state machine and the daily date rule
//! - `person_subscription` - the sold subscription and its opening rules
//! - `freeze` - freeze intervals and the freeze quota policy

mod freeze;
mod person_subscription;
mod status;

pub use freeze::{used_freeze_days, FreezePolicy, SubscriptionFreeze};
pub use person_subscription::{PersonSubscription, PersonSubscriptionDraft, ValidatedDraft};
pub use status::SubscriptionStatus;

//! Background jobs.
//!
//! - `DailyStatusRefresh` - recomputes subscription statuses once a day

mod status_refresh;

pub use status_refresh::{delay_until_next_run, DailyStatusRefresh};

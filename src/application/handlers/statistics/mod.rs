//! Statistics queries.

mod get_statistics;

pub use get_statistics::GetStatisticsHandler;

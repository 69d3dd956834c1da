//! Data models for legalmind

pub mod record;

pub use record::{compression_ratio, Analysis, StoreStats, SummaryRecord};

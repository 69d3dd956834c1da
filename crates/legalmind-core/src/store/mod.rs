//! Persistent summary storage
//!
//! A single SQLite table keyed by content fingerprint. The table's UNIQUE
//! constraint on `fingerprint` guarantees at most one record per input,
//! whatever the number of concurrent writers.

pub mod summary_store;

pub use summary_store::{InsertOutcome, SummaryStore, DB_FILE_NAME};

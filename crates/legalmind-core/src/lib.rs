//! legalmind-core - Core library for legalmind
//!
//! Content-addressed summary cache for contract text: a hasher, a SQLite
//! summary store, and the analyzer that ties them to a summarizer.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod hasher;
pub mod input;
pub mod models;
pub mod store;
pub mod summarizer;

pub use analyzer::ContractAnalyzer;
pub use config::AnalyzerConfig;
pub use error::{AnalyzeError, InputError, StoreError, SummarizeError};
pub use event::{AnalysisEvent, EventBus};
pub use hasher::{fingerprint, Fingerprint};
pub use input::InputSource;
pub use models::{Analysis, StoreStats, SummaryRecord};
pub use store::{InsertOutcome, SummaryStore};
pub use summarizer::{
    HttpSummarizer, LeadSummarizer, LengthBounds, Summarizer, SummarizerBackend,
};

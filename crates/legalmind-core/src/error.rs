//! Error types for legalmind-core
//!
//! Library errors are `thiserror` enums; binaries wrap them with `anyhow`.
//! A duplicate insert is not an error here: it is reported as
//! [`InsertOutcome::AlreadyExists`](crate::store::InsertOutcome) and resolved
//! by the analyzer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`ContractAnalyzer::analyze`](crate::ContractAnalyzer::analyze)
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Empty or whitespace-only input
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The summarizer collaborator failed; nothing was written
    #[error("Summarization failed ({model})")]
    SummarizationFailed {
        model: String,
        #[source]
        source: SummarizeError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AnalyzeError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Summary store errors
#[derive(Error, Debug)]
pub enum StoreError {
    // ===================
    // Setup
    // ===================
    #[error("Failed to create store directory: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open summary database: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to initialize schema")]
    Schema(#[source] rusqlite::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    IncompatibleSchema { found: i64, supported: i64 },

    // ===================
    // Queries
    // ===================
    #[error("Summary store query failed: {operation}")]
    Query {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Corrupt record {fingerprint}: {reason}")]
    Corrupt { fingerprint: String, reason: String },
}

impl StoreError {
    pub(crate) fn query(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| Self::Query { operation, source }
    }
}

/// Summarizer collaborator errors
#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("Summarizer request failed")]
    Request(#[source] reqwest::Error),

    #[error("Summarizer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Summarizer response was malformed: {0}")]
    MalformedResponse(String),

    #[error("Summarizer returned an empty summary")]
    EmptySummary,

    /// The endpoint answered 503, e.g. while a model is still loading
    #[error("Summarizer unavailable: {0}")]
    Unavailable(String),
}

/// Input collaborator errors
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported document format '{extension}' for {path} (plain text only)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("File is not valid UTF-8 text: {path}")]
    NotUtf8 { path: PathBuf },

    #[error("Input is empty")]
    Empty,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

//! Summarizer collaborators
//!
//! The analyzer never loads a model itself. It is handed a [`Summarizer`]
//! whose lifecycle belongs to the host application:
//!
//! - [`HttpSummarizer`]: seq2seq model behind a Hugging Face style inference endpoint
//! - [`LeadSummarizer`]: deterministic extractive fallback, no network
//! - [`SummarizerBackend`]: runtime choice between the two (CLI / web)

pub mod http;
pub mod lead;

pub use http::HttpSummarizer;
pub use lead::LeadSummarizer;

use crate::error::SummarizeError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;

/// Output length bounds passed to the model, in tokens (words for the lead summarizer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min_length: usize,
    pub max_length: usize,
}

impl LengthBounds {
    /// Scale bounds with input size
    ///
    /// `max = clamp(30% of words, 50, 300)`, `min = clamp(10% of words, 30, 100)`.
    pub fn for_input(text: &str) -> Self {
        let words = text.split_whitespace().count();
        Self {
            min_length: (words / 10).clamp(30, 100),
            max_length: (words * 3 / 10).clamp(50, 300),
        }
    }
}

/// Model-backed text summarization
///
/// Implementations impose their own timeouts; the analyzer waits for the
/// returned future to resolve.
pub trait Summarizer: Send + Sync {
    /// Identifier stored alongside each summary
    fn model_name(&self) -> &str;

    fn summarize(
        &self,
        text: &str,
        bounds: LengthBounds,
    ) -> impl Future<Output = Result<String, SummarizeError>> + Send;
}

impl<S: Summarizer> Summarizer for Arc<S> {
    fn model_name(&self) -> &str {
        (**self).model_name()
    }

    fn summarize(
        &self,
        text: &str,
        bounds: LengthBounds,
    ) -> impl Future<Output = Result<String, SummarizeError>> + Send {
        (**self).summarize(text, bounds)
    }
}

/// Summarizer chosen at runtime from configuration
pub enum SummarizerBackend {
    Http(HttpSummarizer),
    Lead(LeadSummarizer),
}

impl Summarizer for SummarizerBackend {
    fn model_name(&self) -> &str {
        match self {
            Self::Http(s) => s.model_name(),
            Self::Lead(s) => s.model_name(),
        }
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError> {
        match self {
            Self::Http(s) => s.summarize(text, bounds).await,
            Self::Lead(s) => s.summarize(text, bounds).await,
        }
    }
}

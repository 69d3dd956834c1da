//! Cache orchestrator
//!
//! `analyze` = fingerprint → store lookup → (on miss) summarize → insert-if-absent.
//!
//! Two callers racing on the same text may both summarize, but only one
//! insert lands; the loser drops its result and returns the stored record.
//! The summarizer is injected, so the analyzer never owns a model.

use crate::config::AnalyzerConfig;
use crate::error::{AnalyzeError, StoreError, SummarizeError};
use crate::event::{AnalysisEvent, EventBus};
use crate::hasher;
use crate::models::{Analysis, SummaryRecord};
use crate::store::{InsertOutcome, SummaryStore};
use crate::summarizer::{LengthBounds, Summarizer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Content-addressed summarization front end
pub struct ContractAnalyzer<S> {
    store: Arc<SummaryStore>,
    summarizer: S,
    max_input_chars: usize,
    events: EventBus,
}

impl<S: Summarizer> ContractAnalyzer<S> {
    pub fn new(store: Arc<SummaryStore>, summarizer: S) -> Self {
        Self {
            store,
            summarizer,
            max_input_chars: AnalyzerConfig::default().max_input_chars,
            events: EventBus::default(),
        }
    }

    pub fn with_config(mut self, config: &AnalyzerConfig) -> Self {
        self.max_input_chars = config.max_input_chars;
        self
    }

    /// Publish analysis events on an existing bus
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn store(&self) -> &Arc<SummaryStore> {
        &self.store
    }

    pub fn summarizer(&self) -> &S {
        &self.summarizer
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    /// Analyze with the injected summarizer
    pub async fn analyze(&self, text: &str) -> Result<Analysis, AnalyzeError> {
        self.analyze_with(text, &self.summarizer).await
    }

    /// Analyze with a summarizer supplied for this call only
    pub async fn analyze_with<T: Summarizer>(
        &self,
        text: &str,
        summarizer: &T,
    ) -> Result<Analysis, AnalyzeError> {
        let original = text.trim();
        if original.is_empty() {
            return Err(AnalyzeError::invalid_input("text is empty"));
        }

        let fingerprint = hasher::fingerprint(original);

        if let Some(record) = self.store.get(&fingerprint)? {
            info!(fingerprint = %fingerprint.short(), "Cache hit");
            self.events.publish(AnalysisEvent::CacheHit(fingerprint));
            return Ok(Analysis {
                record,
                cache_hit: true,
            });
        }

        let input = truncate_chars(original, self.max_input_chars);
        if input.len() < original.len() {
            debug!(
                fingerprint = %fingerprint.short(),
                limit = self.max_input_chars,
                "Input truncated for summarizer"
            );
        }
        let bounds = LengthBounds::for_input(input);
        let model = summarizer.model_name().to_string();

        let started = Instant::now();
        let summary = match summarizer.summarize(input, bounds).await {
            Ok(summary) if summary.trim().is_empty() => Err(SummarizeError::EmptySummary),
            other => other,
        };
        let elapsed = started.elapsed();

        let summary = match summary {
            Ok(summary) => summary,
            Err(source) => {
                warn!(fingerprint = %fingerprint.short(), model = %model, error = %source, "Summarization failed");
                self.events.publish(AnalysisEvent::Failed(fingerprint));
                return Err(AnalyzeError::SummarizationFailed { model, source });
            }
        };

        let record = SummaryRecord::new(
            fingerprint.clone(),
            original,
            summary.trim(),
            elapsed,
            model,
        );

        match self.store.put(&record)? {
            InsertOutcome::Inserted => {
                info!(
                    fingerprint = %fingerprint.short(),
                    elapsed_ms = record.processing_time_ms,
                    ratio = record.compression_ratio,
                    "Summary stored"
                );
                self.events.publish(AnalysisEvent::Stored(fingerprint));
                Ok(Analysis {
                    record,
                    cache_hit: false,
                })
            }
            InsertOutcome::AlreadyExists => {
                // Another caller won the race; the stored record is authoritative
                debug!(fingerprint = %fingerprint.short(), "Lost insert race, returning stored record");
                let stored = self.store.get(&fingerprint)?.ok_or_else(|| StoreError::Corrupt {
                    fingerprint: fingerprint.to_string(),
                    reason: "record missing after conflicting insert".to_string(),
                })?;
                self.events.publish(AnalysisEvent::CacheHit(fingerprint));
                Ok(Analysis {
                    record: stored,
                    cache_hit: true,
                })
            }
        }
    }
}

/// First `max_chars` characters of `text`
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

//! Stored summary record and derived metrics

use crate::hasher::Fingerprint;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One cached summarization result, keyed by fingerprint
///
/// Immutable once stored; the summary store never updates or deletes rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub fingerprint: Fingerprint,
    pub original_text: String,
    pub summary_text: String,
    /// Character count of `original_text`
    pub original_length: usize,
    /// Character count of `summary_text`
    pub summary_length: usize,
    /// `summary_length / original_length`
    pub compression_ratio: f64,
    pub processing_time_ms: u64,
    /// Model that produced the summary
    pub model: String,
    /// Microsecond precision so the value survives a storage round-trip
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    /// Build a fresh record, deriving lengths and ratio from the texts
    pub fn new(
        fingerprint: Fingerprint,
        original_text: impl Into<String>,
        summary_text: impl Into<String>,
        processing_time: Duration,
        model: impl Into<String>,
    ) -> Self {
        let original_text = original_text.into();
        let summary_text = summary_text.into();
        let original_length = original_text.chars().count();
        let summary_length = summary_text.chars().count();

        Self {
            fingerprint,
            original_text,
            summary_text,
            original_length,
            summary_length,
            compression_ratio: compression_ratio(summary_length, original_length),
            processing_time_ms: processing_time.as_millis() as u64,
            model: model.into(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// "4.2:1" style display used by the history views
    pub fn reduction_display(&self) -> String {
        if self.summary_length == 0 {
            return "-".to_string();
        }
        format!(
            "{:.1}:1",
            self.original_length as f64 / self.summary_length as f64
        )
    }

    /// Processing time in seconds
    pub fn processing_secs(&self) -> f64 {
        self.processing_time_ms as f64 / 1000.0
    }
}

/// Ratio of summary to original length; 0.0 for an empty original
pub fn compression_ratio(summary_length: usize, original_length: usize) -> f64 {
    if original_length == 0 {
        return 0.0;
    }
    summary_length as f64 / original_length as f64
}

/// Result of an analyze call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub record: SummaryRecord,
    /// True when the record came from the store rather than this call's summarizer run
    pub cache_hit: bool,
}

/// Aggregates over the whole store (history dashboard)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_records: usize,
    pub avg_processing_ms: f64,
    pub avg_compression_ratio: f64,
    pub total_original_chars: u64,
    pub total_summary_chars: u64,
}

impl StoreStats {
    /// Overall reduction factor (original chars per summary char)
    pub fn overall_reduction(&self) -> f64 {
        if self.total_summary_chars == 0 {
            return 0.0;
        }
        self.total_original_chars as f64 / self.total_summary_chars as f64
    }
}

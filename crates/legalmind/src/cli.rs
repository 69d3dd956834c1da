//! CLI formatting and lookup helpers
//!
//! Table/JSON renderers for history, single records and stats, plus
//! fingerprint prefix resolution for `show`.

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use legalmind_core::{Analysis, Fingerprint, StoreError, StoreStats, SummaryRecord, SummaryStore};

/// Shortest prefix accepted by `show`
const MIN_PREFIX_LEN: usize = 8;

/// Matches fetched when resolving a prefix; more than one is ambiguous
const PREFIX_PROBE_LIMIT: usize = 6;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum CliError {
    NoResults {
        query: String,
        scanned: usize,
    },
    AmbiguousId {
        prefix: String,
        suggestions: String,
    },
    Store(StoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NoResults { query, scanned } => {
                write!(
                    f,
                    "No summary matches '{}' ({} records stored)",
                    query, scanned
                )
            }
            CliError::AmbiguousId {
                prefix,
                suggestions,
            } => {
                write!(
                    f,
                    "Ambiguous fingerprint prefix '{}':\n{}",
                    prefix, suggestions
                )
            }
            CliError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CliError {
    fn from(e: StoreError) -> Self {
        CliError::Store(e)
    }
}

// ============================================================================
// Query Helpers
// ============================================================================

/// Find a record by full fingerprint or unique prefix (min 8 chars)
pub fn resolve_record(store: &SummaryStore, id: &str) -> Result<SummaryRecord, CliError> {
    let id = id.trim();

    if let Ok(fingerprint) = id.parse::<Fingerprint>() {
        if let Some(record) = store.get(&fingerprint)? {
            return Ok(record);
        }
    }

    if id.len() < MIN_PREFIX_LEN {
        return Err(CliError::NoResults {
            query: id.to_string(),
            scanned: store.count()?,
        });
    }

    let matches = store.find_by_prefix(id, PREFIX_PROBE_LIMIT)?;
    if matches.is_empty() {
        return Err(CliError::NoResults {
            query: id.to_string(),
            scanned: store.count()?,
        });
    }
    select_unique(id, matches)
}

fn select_unique(prefix: &str, mut matches: Vec<SummaryRecord>) -> Result<SummaryRecord, CliError> {
    if matches.len() == 1 {
        if let Some(record) = matches.pop() {
            return Ok(record);
        }
    }

    let suggestions = matches
        .iter()
        .take(PREFIX_PROBE_LIMIT - 1)
        .map(|r| format!("  - {}  {}", &r.fingerprint.as_str()[..16], one_line(&r.summary_text, 50)))
        .collect::<Vec<_>>()
        .join("\n");
    Err(CliError::AmbiguousId {
        prefix: prefix.to_string(),
        suggestions,
    })
}

// ============================================================================
// Formatters
// ============================================================================

/// Format history as table (human) or JSON
pub fn format_history_table(records: &[SummaryRecord], json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string());
    }

    if records.is_empty() {
        return "No summaries stored yet.".to_string();
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers = [
        "Fingerprint",
        "Created",
        "Original",
        "Summary",
        "Reduction",
        "Time",
        "Preview",
    ];
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }

    for record in records {
        let created = record
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(Row::from(vec![
            record.fingerprint.short().to_string(),
            created,
            record.original_length.to_string(),
            record.summary_length.to_string(),
            record.reduction_display(),
            format!("{:.2}s", record.processing_secs()),
            one_line(&record.summary_text, 60),
        ]));
    }

    table.to_string()
}

/// Format one analysis result (human or JSON)
pub fn format_analysis(analysis: &Analysis, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string());
    }

    let record = &analysis.record;
    let status = if analysis.cache_hit {
        "cached (summarizer skipped)"
    } else {
        "new summary"
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let status_cell = if no_color {
        Cell::new(status)
    } else if analysis.cache_hit {
        Cell::new(status).fg(Color::Green)
    } else {
        Cell::new(status).fg(Color::Yellow)
    };
    table.add_row(vec![Cell::new("Status"), status_cell]);
    table.add_row(vec!["Fingerprint", record.fingerprint.as_str()]);
    table.add_row(vec!["Model", record.model.as_str()]);
    table.add_row(vec![
        "Length".to_string(),
        format!(
            "{} → {} chars ({})",
            record.original_length,
            record.summary_length,
            record.reduction_display()
        ),
    ]);
    table.add_row(vec![
        "Processing".to_string(),
        format!("{:.2}s", record.processing_secs()),
    ]);

    format!("{}\n\n{}", table, record.summary_text)
}

/// Format single record detail (human or JSON)
pub fn format_record(record: &SummaryRecord, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push(format!("Fingerprint:      {}", record.fingerprint));
    lines.push(format!("Created:          {}", record.created_at.to_rfc3339()));
    lines.push(format!("Model:            {}", record.model));
    lines.push(format!("Original length:  {} chars", record.original_length));
    lines.push(format!("Summary length:   {} chars", record.summary_length));
    lines.push(format!(
        "Compression:      {:.3} ({})",
        record.compression_ratio,
        record.reduction_display()
    ));
    lines.push(format!("Processing time:  {} ms", record.processing_time_ms));
    lines.push(String::new());
    lines.push("Summary:".to_string());
    lines.push(record.summary_text.clone());
    lines.push(String::new());
    lines.push("Original:".to_string());
    lines.push(record.original_text.clone());

    lines.join("\n")
}

/// Format store aggregates (human or JSON)
pub fn format_stats(stats: &StoreStats, json: bool) -> String {
    if json {
        return serde_json::to_string_pretty(stats).unwrap_or_else(|_| "{}".to_string());
    }

    let mut lines = vec![];
    lines.push("legalmind - Summary Statistics".to_string());
    lines.push("==============================".to_string());
    lines.push(String::new());
    lines.push(format!("Records:            {}", stats.total_records));

    if stats.total_records > 0 {
        lines.push(format!(
            "Original text:      {} chars",
            format_count(stats.total_original_chars)
        ));
        lines.push(format!(
            "Summaries:          {} chars",
            format_count(stats.total_summary_chars)
        ));
        lines.push(format!(
            "Overall reduction:  {:.1}:1",
            stats.overall_reduction()
        ));
        lines.push(format!(
            "Avg ratio:          {:.3}",
            stats.avg_compression_ratio
        ));
        lines.push(format!(
            "Avg processing:     {:.0} ms",
            stats.avg_processing_ms
        ));
    }

    lines.join("\n")
}

// ============================================================================
// Utilities
// ============================================================================

fn format_count(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Collapse whitespace and truncate for single-line previews
fn one_line(s: &str, max: usize) -> String {
    truncate(&s.split_whitespace().collect::<Vec<_>>().join(" "), max)
}

fn truncate(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        s.chars().take(max.saturating_sub(1)).collect::<String>() + "…"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use legalmind_core::fingerprint;
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_record(text: &str) -> SummaryRecord {
        SummaryRecord::new(
            fingerprint(text),
            text,
            "Short summary.",
            Duration::from_millis(1500),
            "lead-extractive",
        )
    }

    fn store_with(texts: &[&str]) -> (TempDir, SummaryStore) {
        let dir = TempDir::new().unwrap();
        let store = SummaryStore::open_in_dir(dir.path()).unwrap();
        for text in texts {
            store.put(&create_test_record(text)).unwrap();
        }
        (dir, store)
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("§§§§§§", 4), "§§§…");
    }

    #[test]
    fn test_one_line_collapses_newlines() {
        assert_eq!(one_line("a\n\nb   c", 20), "a b c");
    }

    #[test]
    fn test_resolve_full_fingerprint() {
        let (_dir, store) = store_with(&["Clause A.", "Clause B."]);
        let fp = fingerprint("Clause A.");

        let record = resolve_record(&store, fp.as_str()).unwrap();
        assert_eq!(record.fingerprint, fp);
    }

    #[test]
    fn test_resolve_prefix() {
        let (_dir, store) = store_with(&["Clause A.", "Clause B."]);
        let fp = fingerprint("Clause B.");

        let record = resolve_record(&store, &fp.as_str()[..10].to_uppercase()).unwrap();
        assert_eq!(record.fingerprint, fp);
    }

    #[test]
    fn test_resolve_short_prefix_rejected() {
        let (_dir, store) = store_with(&["Clause A."]);
        let fp = fingerprint("Clause A.");

        let result = resolve_record(&store, &fp.as_str()[..7]);
        assert!(matches!(result, Err(CliError::NoResults { scanned: 1, .. })));
    }

    #[test]
    fn test_resolve_not_found() {
        let (_dir, store) = store_with(&["Clause A."]);

        let result = resolve_record(&store, "notfound");
        assert!(matches!(result, Err(CliError::NoResults { .. })));
    }

    #[test]
    fn test_select_unique_ambiguous() {
        let matches = vec![create_test_record("One."), create_test_record("Two.")];

        let result = select_unique("deadbeef", matches);
        match result {
            Err(CliError::AmbiguousId { suggestions, .. }) => {
                assert_eq!(suggestions.lines().count(), 2);
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|r| r.fingerprint)),
        }
    }

    #[test]
    fn test_format_history_table_empty() {
        let output = format_history_table(&[], false, false);
        assert!(output.contains("No summaries stored yet"));
    }

    #[test]
    fn test_format_history_table_json() {
        let records = vec![create_test_record("Clause A.")];
        let output = format_history_table(&records, true, false);
        assert!(output.starts_with('['));
        assert!(output.contains(records[0].fingerprint.as_str()));
    }

    #[test]
    fn test_format_history_table_human() {
        let records = vec![create_test_record("Clause A.")];
        let output = format_history_table(&records, false, true);
        assert!(output.contains(records[0].fingerprint.short()));
        assert!(output.contains("Short summary."));
    }

    #[test]
    fn test_format_analysis_json() {
        let analysis = Analysis {
            record: create_test_record("Clause A."),
            cache_hit: true,
        };
        let output = format_analysis(&analysis, true, false);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["cache_hit"], true);
    }

    #[test]
    fn test_format_record_includes_texts() {
        let record = create_test_record("Full original clause text.");
        let output = format_record(&record, false);
        assert!(output.contains("Full original clause text."));
        assert!(output.contains("Short summary."));
        assert!(output.contains("lead-extractive"));
    }

    #[test]
    fn test_format_stats_empty() {
        let output = format_stats(&StoreStats::default(), false);
        assert!(output.contains("Records:            0"));
        assert!(!output.contains("Avg ratio"));
    }
}

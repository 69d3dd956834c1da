//! Export summary history to CSV and JSON

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::models::SummaryRecord;

/// Export records to CSV format
///
/// CSV columns: Created At, Fingerprint, Model, Original Length, Summary Length,
/// Compression Ratio, Processing Time (ms), Summary
///
/// # Arguments
/// * `records` - Records to export (written in the given order)
/// * `path` - Destination file path (created/overwritten)
///
/// # Examples
///
/// ```no_run
/// use legalmind_core::export::export_records_to_csv;
/// use std::path::Path;
///
/// let records = vec![]; // store.list_all()?
/// export_records_to_csv(&records, Path::new("history.csv")).unwrap();
/// ```
pub fn export_records_to_csv(records: &[SummaryRecord], path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "Created At,Fingerprint,Model,Original Length,Summary Length,Compression Ratio,Processing Time (ms),Summary"
    )
    .context("Failed to write CSV header")?;

    for record in records {
        writeln!(
            writer,
            "{},{},{},{},{},{:.4},{},{}",
            record.created_at.to_rfc3339(),
            record.fingerprint,
            csv_field(&record.model),
            record.original_length,
            record.summary_length,
            record.compression_ratio,
            record.processing_time_ms,
            csv_field(&record.summary_text),
        )
        .with_context(|| format!("Failed to write row for {}", record.fingerprint.short()))?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Export records to JSON format
///
/// Pretty-printed JSON array of full records (original text included)
pub fn export_records_to_json(records: &[SummaryRecord], path: &Path) -> Result<()> {
    create_parent_dir(path)?;

    let json =
        serde_json::to_string_pretty(records).context("Failed to serialize records to JSON")?;

    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

    Ok(())
}

fn create_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Quote a CSV field, doubling embedded quotes
fn csv_field(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

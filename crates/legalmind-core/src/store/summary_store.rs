//! SQLite summary store
//!
//! Durable fingerprint → summary table with a UNIQUE constraint on
//! `fingerprint`. The constraint is what enforces "at most one record per
//! fingerprint", including across connections and processes; inserts go
//! through `ON CONFLICT DO NOTHING` so a lost race is an ordinary outcome.
//!
//! Schema:
//! - summaries: one row per fingerprint, append-only
//! - store_metadata: key/value pairs (schema version)
//! - Indexes: created_at for history ordering
//!
//! Schema Version History:
//! - v1: Initial summaries table
//! - v2: Added model column

use crate::error::StoreError;
use crate::hasher::Fingerprint;
use crate::models::{StoreStats, SummaryRecord};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Current schema version
///
/// Databases written by a newer build are refused rather than silently
/// misread; older versions are migrated forward in `init_schema`.
const SCHEMA_VERSION: i64 = 2;

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "legalmind.db";

/// How long a writer waits on another connection's lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_COLUMNS: &str = "fingerprint, original_text, summary_text, original_length, \
     summary_length, compression_ratio, processing_time_ms, model, created_at";

/// Result of [`SummaryStore::put`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record is now stored
    Inserted,
    /// A record with this fingerprint already existed; nothing was written
    AlreadyExists,
}

/// SQLite-backed summary store (thread-safe)
pub struct SummaryStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SummaryStore {
    /// Open or create the store at `<data_dir>/legalmind.db`
    pub fn open_in_dir(data_dir: &Path) -> Result<Self, StoreError> {
        Self::open(&data_dir.join(DB_FILE_NAME))
    }

    /// Open or create the store at an explicit database path
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(db_path).map_err(|source| StoreError::Open {
            path: db_path.to_path_buf(),
            source,
        })?;

        // WAL lets history reads proceed while an analysis is being written
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(StoreError::Schema)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(StoreError::Schema)?;

        init_schema(&conn)?;

        debug!(path = %db_path.display(), "Summary store opened");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
        })
    }

    /// Path of the underlying database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Look up a record by fingerprint
    pub fn get(&self, fingerprint: &Fingerprint) -> Result<Option<SummaryRecord>, StoreError> {
        let conn = self.conn.lock();

        let sql = format!("SELECT {SELECT_COLUMNS} FROM summaries WHERE fingerprint = ?1");
        let row = conn
            .query_row(&sql, params![fingerprint.as_str()], StoredRow::from_row)
            .optional()
            .map_err(StoreError::query("get"))?;

        match row {
            Some(row) => {
                debug!(fingerprint = %fingerprint.short(), "Store hit");
                row.into_record().map(Some)
            }
            None => {
                debug!(fingerprint = %fingerprint.short(), "Store miss");
                Ok(None)
            }
        }
    }

    /// Insert a record unless its fingerprint is already present
    ///
    /// A single statement: there is no check-then-insert window.
    pub fn put(&self, record: &SummaryRecord) -> Result<InsertOutcome, StoreError> {
        let conn = self.conn.lock();

        let changed = conn
            .execute(
                r#"
                INSERT INTO summaries
                (fingerprint, original_text, summary_text, original_length, summary_length,
                 compression_ratio, processing_time_ms, model, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(fingerprint) DO NOTHING
                "#,
                params![
                    record.fingerprint.as_str(),
                    &record.original_text,
                    &record.summary_text,
                    record.original_length as i64,
                    record.summary_length as i64,
                    record.compression_ratio,
                    record.processing_time_ms as i64,
                    &record.model,
                    record.created_at.timestamp_micros(),
                ],
            )
            .map_err(StoreError::query("put"))?;

        if changed == 0 {
            debug!(fingerprint = %record.fingerprint.short(), "Insert skipped, fingerprint exists");
            Ok(InsertOutcome::AlreadyExists)
        } else {
            debug!(fingerprint = %record.fingerprint.short(), "Summary stored");
            Ok(InsertOutcome::Inserted)
        }
    }

    /// All records, newest first
    pub fn list_all(&self) -> Result<Vec<SummaryRecord>, StoreError> {
        self.list(None)
    }

    /// The `limit` newest records
    pub fn list_recent(&self, limit: usize) -> Result<Vec<SummaryRecord>, StoreError> {
        self.list(Some(limit))
    }

    fn list(&self, limit: Option<usize>) -> Result<Vec<SummaryRecord>, StoreError> {
        let conn = self.conn.lock();

        // id breaks ties between records created in the same microsecond
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM summaries ORDER BY created_at DESC, id DESC LIMIT ?1"
        );
        let limit = limit.map(|l| l.min(i64::MAX as usize) as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&sql).map_err(StoreError::query("list"))?;
        let rows = stmt
            .query_map(params![limit], StoredRow::from_row)
            .map_err(StoreError::query("list"))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(StoreError::query("list"))?.into_record()?);
        }
        Ok(records)
    }

    /// Records whose fingerprint starts with `prefix`, newest first
    ///
    /// `prefix` is matched case-insensitively; non-hex input matches nothing.
    pub fn find_by_prefix(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<SummaryRecord>, StoreError> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM summaries WHERE substr(fingerprint, 1, ?1) = ?2 \
             ORDER BY created_at DESC, id DESC LIMIT ?3"
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(StoreError::query("find_by_prefix"))?;
        let rows = stmt
            .query_map(
                params![prefix.len() as i64, &prefix, limit as i64],
                StoredRow::from_row,
            )
            .map_err(StoreError::query("find_by_prefix"))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(
                row.map_err(StoreError::query("find_by_prefix"))?
                    .into_record()?,
            );
        }
        Ok(records)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM summaries", [], |row| row.get(0))
            .map_err(StoreError::query("count"))?;
        Ok(count as usize)
    }

    /// Aggregate metrics over every stored record
    pub fn stats(&self) -> Result<StoreStats, StoreError> {
        let conn = self.conn.lock();

        let (count, avg_ms, avg_ratio, original, summary): (
            i64,
            Option<f64>,
            Option<f64>,
            Option<i64>,
            Option<i64>,
        ) = conn
            .query_row(
                r#"
                SELECT COUNT(*), AVG(processing_time_ms), AVG(compression_ratio),
                       SUM(original_length), SUM(summary_length)
                FROM summaries
                "#,
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
            )
            .map_err(StoreError::query("stats"))?;

        Ok(StoreStats {
            total_records: count as usize,
            avg_processing_ms: avg_ms.unwrap_or(0.0),
            avg_compression_ratio: avg_ratio.unwrap_or(0.0),
            total_original_chars: original.unwrap_or(0) as u64,
            total_summary_chars: summary.unwrap_or(0) as u64,
        })
    }

    /// Vacuum database to reclaim space
    pub fn vacuum(&self) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute("VACUUM", [])
            .map_err(StoreError::query("vacuum"))?;
        debug!("Database vacuumed");
        Ok(())
    }
}

impl Drop for SummaryStore {
    fn drop(&mut self) {
        // Flush WAL into the main file so it doesn't grow across restarts
        let conn = self.conn.lock();
        if let Err(e) = conn.pragma_update(None, "wal_checkpoint", "TRUNCATE") {
            warn!("Failed to checkpoint WAL on SummaryStore drop: {}", e);
        }
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_metadata (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT NOT NULL UNIQUE,
            original_text TEXT NOT NULL,
            summary_text TEXT NOT NULL,
            original_length INTEGER NOT NULL,
            summary_length INTEGER NOT NULL,
            compression_ratio REAL NOT NULL,
            processing_time_ms INTEGER NOT NULL,
            model TEXT NOT NULL DEFAULT 'unknown',
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_summaries_created_at ON summaries(created_at);
        "#,
    )
    .map_err(StoreError::Schema)?;

    let stored_version: Option<i64> = conn
        .query_row(
            "SELECT value FROM store_metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(StoreError::Schema)?;

    match stored_version {
        Some(v) if v > SCHEMA_VERSION => {
            return Err(StoreError::IncompatibleSchema {
                found: v,
                supported: SCHEMA_VERSION,
            });
        }
        Some(v) if v < SCHEMA_VERSION => {
            warn!(
                stored = v,
                current = SCHEMA_VERSION,
                "Summary store schema is older, migrating"
            );
            if v < 2 {
                conn.execute(
                    "ALTER TABLE summaries ADD COLUMN model TEXT NOT NULL DEFAULT 'unknown'",
                    [],
                )
                .map_err(StoreError::Schema)?;
            }
            set_schema_version(conn)?;
        }
        Some(_) => {
            debug!("Schema version {} matches current", SCHEMA_VERSION);
        }
        None => {
            set_schema_version(conn)?;
            debug!("Schema version initialized to {}", SCHEMA_VERSION);
        }
    }

    Ok(())
}

fn set_schema_version(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO store_metadata (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )
    .map_err(StoreError::Schema)?;
    Ok(())
}

/// Raw column values, validated separately so a bad row reports its fingerprint
struct StoredRow {
    fingerprint: String,
    original_text: String,
    summary_text: String,
    original_length: i64,
    summary_length: i64,
    compression_ratio: f64,
    processing_time_ms: i64,
    model: String,
    created_at_micros: i64,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            fingerprint: row.get(0)?,
            original_text: row.get(1)?,
            summary_text: row.get(2)?,
            original_length: row.get(3)?,
            summary_length: row.get(4)?,
            compression_ratio: row.get(5)?,
            processing_time_ms: row.get(6)?,
            model: row.get(7)?,
            created_at_micros: row.get(8)?,
        })
    }

    fn into_record(self) -> Result<SummaryRecord, StoreError> {
        let corrupt = |fingerprint: &str, reason: &str| StoreError::Corrupt {
            fingerprint: fingerprint.to_string(),
            reason: reason.to_string(),
        };

        let fingerprint: Fingerprint = self
            .fingerprint
            .parse()
            .map_err(|_| corrupt(&self.fingerprint, "malformed fingerprint"))?;

        let created_at = DateTime::<Utc>::from_timestamp_micros(self.created_at_micros)
            .ok_or_else(|| corrupt(&self.fingerprint, "created_at out of range"))?;

        if self.original_length < 0 || self.summary_length < 0 || self.processing_time_ms < 0 {
            return Err(corrupt(&self.fingerprint, "negative metric"));
        }

        Ok(SummaryRecord {
            fingerprint,
            original_text: self.original_text,
            summary_text: self.summary_text,
            original_length: self.original_length as usize,
            summary_length: self.summary_length as usize,
            compression_ratio: self.compression_ratio,
            processing_time_ms: self.processing_time_ms as u64,
            model: self.model,
            created_at,
        })
    }
}

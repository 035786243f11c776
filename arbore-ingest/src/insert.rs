//! Direct-insert loader: one parameterized statement per record.
//!
//! Statements commit as they run. When one fails the error is returned and
//! every record written before it stays in the warehouse.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;
use std::path::Path;

use arbore_core::{RecordKind, classify_value};

use crate::error::Result;
use crate::input::{JsonInput, read_json_file, read_lines};
use crate::rows::TableSpec;
use crate::warehouse::Session;

/// Progress is logged every this many records of an array file.
pub const PROGRESS_EVERY: usize = 1000;

/// Per-run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub orders: usize,
    pub claims: usize,
    /// Records that matched neither signature.
    pub skipped: usize,
}

impl LoadStats {
    pub fn total(&self) -> usize {
        self.orders + self.claims + self.skipped
    }
}

pub struct InsertLoader<S: Session> {
    session: S,
    stats: LoadStats,
}

impl<S: Session> InsertLoader<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            stats: LoadStats::default(),
        }
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Route one record to its table. Unknown records are logged and skipped.
    pub fn save(&mut self, record: &Value) -> Result<RecordKind> {
        let kind = classify_value(record);
        let (Some(table), Value::Object(fields)) = (TableSpec::for_kind(kind), record) else {
            tracing::warn!(record = %record, "unknown record type");
            self.stats.skipped += 1;
            return Ok(RecordKind::Unknown);
        };

        let row = table.row(fields);
        self.session.execute(table.insert_sql, &row)?;
        match kind {
            RecordKind::Order => self.stats.orders += 1,
            _ => self.stats.claims += 1,
        }
        tracing::debug!(kind = %kind, id = %row[0], table = table.table, "record inserted");
        Ok(kind)
    }

    /// Load a `.json` file holding an array of records or a single record.
    pub fn load_json_file(&mut self, path: &Path) -> Result<LoadStats> {
        tracing::info!(path = %path.display(), "loading records");
        match read_json_file(path)? {
            JsonInput::Array(records) => {
                let total = records.len();
                for (i, record) in records.iter().enumerate() {
                    self.save(record)?;
                    if (i + 1) % PROGRESS_EVERY == 0 {
                        tracing::info!(processed = i + 1, total, "insert progress");
                    }
                }
                tracing::info!(total, path = %path.display(), "completed loading records");
            }
            JsonInput::Single(record) => {
                self.save(&record)?;
                tracing::info!(path = %path.display(), "loaded 1 record");
            }
        }
        Ok(self.stats)
    }

    /// Insert newline-separated records until a blank line or EOF.
    pub fn load_lines<R: BufRead>(&mut self, reader: R) -> Result<LoadStats> {
        for record in read_lines(reader) {
            self.save(&record?)?;
        }
        tracing::info!(records = self.stats.total(), "stream input processing complete");
        Ok(self.stats)
    }

    /// Close the session and return the final counters.
    pub fn finish(self) -> Result<LoadStats> {
        self.session.close()?;
        Ok(self.stats)
    }
}

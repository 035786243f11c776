//! Staging collaborators: batch file encoding, the stage area files are
//! uploaded to, and the pipe that is told about them.
//!
//! A pipe only acknowledges that files were queued. Loading them into the
//! target table happens later, out of band (see [`crate::drain`]).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::rows::PIPE_HISTORY_TABLE;
use crate::warehouse::Session;

pub const QUEUED: &str = "QUEUED";
pub const LOADED: &str = "LOADED";
pub const LOAD_FAILED: &str = "LOAD_FAILED";
pub const RESPONSE_SUCCESS: &str = "SUCCESS";

/// Encodes one batch of rows into a local file.
pub trait StageFileWriter {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// Write `rows` (in `columns` order) to `path`. Returns the file size.
    fn write_batch(&self, path: &Path, columns: &[&str], rows: &[Vec<Value>]) -> Result<u64>;
}

/// One JSON object per line, keyed by upper-case column name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLinesWriter;

impl StageFileWriter for JsonLinesWriter {
    fn extension(&self) -> &'static str {
        "jsonl"
    }

    fn write_batch(&self, path: &Path, columns: &[&str], rows: &[Vec<Value>]) -> Result<u64> {
        let file = std::fs::File::create(path)?;
        let mut out = std::io::BufWriter::new(file);
        for row in rows {
            let object: Map<String, Value> = columns
                .iter()
                .zip(row)
                .map(|(c, v)| ((*c).to_string(), v.clone()))
                .collect();
            serde_json::to_writer(&mut out, &object)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(std::fs::metadata(path)?.len())
    }
}

/// A file that has been uploaded to a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedFile {
    pub name: String,
    pub size: Option<u64>,
}

/// Where batch files are uploaded before a pipe picks them up.
pub trait StageArea {
    /// Upload `local` into the stage of `table`.
    fn put(&self, local: &Path, table: &str) -> Result<StagedFile>;
}

/// Stage area on the local file system: `<root>/<TABLE>/<file>`.
#[derive(Debug, Clone)]
pub struct LocalStage {
    root: PathBuf,
}

impl LocalStage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn table_dir(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    pub fn file_path(&self, table: &str, file_name: &str) -> PathBuf {
        self.table_dir(table).join(file_name)
    }
}

impl StageArea for LocalStage {
    fn put(&self, local: &Path, table: &str) -> Result<StagedFile> {
        let name = local
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| IngestError::stage(format!("invalid file name: {}", local.display())))?
            .to_string();
        let dir = self.table_dir(table);
        std::fs::create_dir_all(&dir)?;
        let size = std::fs::copy(local, dir.join(&name))?;
        tracing::debug!(file = %name, table, size, "file staged");
        Ok(StagedFile {
            name,
            size: Some(size),
        })
    }
}

/// Acknowledgment returned by [`IngestPipe::ingest_files`]. It confirms that
/// the files were accepted for loading, not that they were loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub response_code: String,
    pub files: Vec<String>,
}

/// Queues staged files for asynchronous loading into one table.
pub trait IngestPipe {
    /// Fully qualified pipe identifier.
    fn name(&self) -> &str;

    fn ingest_files(&mut self, files: &[StagedFile]) -> Result<IngestResponse>;
}

/// Last dot-separated segment of a pipe identifier.
pub fn short_pipe_name(pipe: &str) -> &str {
    pipe.rsplit('.').next().unwrap_or(pipe)
}

/// Pipe that records each submitted file as `QUEUED` in the pipe history
/// table of a warehouse session.
pub struct LocalPipe<S: Session> {
    name: String,
    table: String,
    session: S,
}

impl<S: Session> LocalPipe<S> {
    pub fn new(name: impl Into<String>, table: impl Into<String>, session: S) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            session,
        }
    }

    pub fn close(self) -> Result<()> {
        self.session.close()
    }
}

impl<S: Session> IngestPipe for LocalPipe<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn ingest_files(&mut self, files: &[StagedFile]) -> Result<IngestResponse> {
        if files.is_empty() {
            return Err(IngestError::pipe(&self.name, "no files submitted"));
        }
        let sql = format!(
            "INSERT INTO {PIPE_HISTORY_TABLE} (PIPE_NAME, TABLE_NAME, FILE_NAME, STATUS, FILE_SIZE, QUEUED_AT) \
             VALUES (?, ?, ?, ?, ?, ?)"
        );
        let queued_at = Utc::now().to_rfc3339();
        for file in files {
            self.session.execute(
                &sql,
                &[
                    Value::from(short_pipe_name(&self.name)),
                    Value::from(self.table.as_str()),
                    Value::from(file.name.as_str()),
                    Value::from(QUEUED),
                    file.size.map_or(Value::Null, Value::from),
                    Value::from(queued_at.as_str()),
                ],
            )?;
        }
        Ok(IngestResponse {
            response_code: RESPONSE_SUCCESS.to_string(),
            files: files.iter().map(|f| f.name.clone()).collect(),
        })
    }
}

//! Staged micro-batch loader.
//!
//! Records are buffered per kind. A full buffer is written to a batch file in
//! a per-run temporary directory, uploaded to the stage, deleted locally and
//! submitted to the kind's pipe. The pipe only queues the file; the rows show
//! up in the table once the pipe is drained.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

use arbore_core::{ArboreError, RecordKind, classify_value};

use crate::error::Result;
use crate::input::read_json_file;
use crate::rows::{CLAIMS, ORDERS, TableSpec};
use crate::stage::{IngestPipe, StageArea, StageFileWriter};

/// Outcome of a staged run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedReport {
    pub orders: usize,
    pub claims: usize,
    pub unknown: usize,
    /// Names of the files submitted to a pipe, in submission order.
    pub files: Vec<String>,
}

struct Buffer {
    table: TableSpec,
    rows: Vec<Vec<Value>>,
}

pub struct StagedLoader {
    writer: Box<dyn StageFileWriter>,
    stage: Box<dyn StageArea>,
    orders_pipe: Box<dyn IngestPipe>,
    claims_pipe: Box<dyn IngestPipe>,
    batch_size: usize,
    temp_dir: TempDir,
    orders: Buffer,
    claims: Buffer,
    report: StagedReport,
}

impl StagedLoader {
    pub fn new(
        writer: Box<dyn StageFileWriter>,
        stage: Box<dyn StageArea>,
        orders_pipe: Box<dyn IngestPipe>,
        claims_pipe: Box<dyn IngestPipe>,
        batch_size: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(ArboreError::invalid_input("batch size must be at least 1").into());
        }
        Ok(Self {
            writer,
            stage,
            orders_pipe,
            claims_pipe,
            batch_size,
            temp_dir: tempfile::tempdir()?,
            orders: Buffer {
                table: ORDERS,
                rows: Vec::new(),
            },
            claims: Buffer {
                table: CLAIMS,
                rows: Vec::new(),
            },
            report: StagedReport::default(),
        })
    }

    /// Buffer one record, flushing its kind's buffer when it is full.
    pub fn push(&mut self, record: &Value) -> Result<RecordKind> {
        let kind = classify_value(record);
        let fields = match record {
            Value::Object(fields) if kind != RecordKind::Unknown => fields,
            _ => {
                tracing::warn!(record = %record, "unknown record type skipped");
                self.report.unknown += 1;
                return Ok(RecordKind::Unknown);
            }
        };
        match kind {
            RecordKind::Order => {
                self.orders.rows.push(self.orders.table.row(fields));
                if self.orders.rows.len() >= self.batch_size {
                    self.flush(RecordKind::Order)?;
                    tracing::info!(orders = self.report.orders, "orders staged so far");
                }
            }
            RecordKind::Claim => {
                self.claims.rows.push(self.claims.table.row(fields));
                if self.claims.rows.len() >= self.batch_size {
                    self.flush(RecordKind::Claim)?;
                    tracing::info!(claims = self.report.claims, "claims staged so far");
                }
            }
            RecordKind::Unknown => {}
        }
        Ok(kind)
    }

    fn flush(&mut self, kind: RecordKind) -> Result<()> {
        let (buffer, pipe) = match kind {
            RecordKind::Order => (&mut self.orders, &mut self.orders_pipe),
            RecordKind::Claim => (&mut self.claims, &mut self.claims_pipe),
            RecordKind::Unknown => return Ok(()),
        };
        if buffer.rows.is_empty() {
            return Ok(());
        }

        let table = buffer.table;
        let file_name = format!(
            "{}_{}.{}",
            table.file_prefix,
            uuid::Uuid::new_v4(),
            self.writer.extension()
        );
        let local = self.temp_dir.path().join(&file_name);
        self.writer.write_batch(&local, table.columns, &buffer.rows)?;
        let staged = self.stage.put(&local, table.table)?;
        std::fs::remove_file(&local)?;

        let response = pipe.ingest_files(std::slice::from_ref(&staged))?;
        tracing::info!(
            pipe = pipe.name(),
            file = %staged.name,
            rows = buffer.rows.len(),
            response_code = %response.response_code,
            "batch submitted"
        );

        let count = buffer.rows.len();
        buffer.rows.clear();
        match kind {
            RecordKind::Order => self.report.orders += count,
            _ => self.report.claims += count,
        }
        self.report.files.push(staged.name);
        Ok(())
    }

    /// Flush whatever is left and return the report. The temporary directory
    /// is removed on return.
    pub fn finish(mut self) -> Result<StagedReport> {
        self.flush(RecordKind::Order)?;
        self.flush(RecordKind::Claim)?;
        tracing::info!(
            orders = self.report.orders,
            claims = self.report.claims,
            unknown = self.report.unknown,
            files = self.report.files.len(),
            "staging complete; rows appear once the pipes are drained"
        );
        Ok(self.report)
    }

    /// Stage every record of a `.json` file.
    pub fn stage_json_file(mut self, path: &Path) -> Result<StagedReport> {
        tracing::info!(path = %path.display(), batch_size = self.batch_size, "staging records");
        for record in read_json_file(path)?.into_records() {
            self.push(&record)?;
        }
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::stage::{IngestResponse, JsonLinesWriter, LocalStage, StagedFile};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingPipe {
        name: &'static str,
        submitted: Rc<RefCell<Vec<String>>>,
        fail: bool,
    }

    impl IngestPipe for RecordingPipe {
        fn name(&self) -> &str {
            self.name
        }

        fn ingest_files(&mut self, files: &[StagedFile]) -> Result<IngestResponse> {
            if self.fail {
                return Err(IngestError::pipe(self.name, "unavailable"));
            }
            let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
            self.submitted.borrow_mut().extend(names.iter().cloned());
            Ok(IngestResponse {
                response_code: "SUCCESS".into(),
                files: names,
            })
        }
    }

    fn loader(
        stage_root: &Path,
        batch_size: usize,
    ) -> (StagedLoader, RecordingPipe, RecordingPipe) {
        let orders = RecordingPipe {
            name: "ORDERS_PIPE",
            ..Default::default()
        };
        let claims = RecordingPipe {
            name: "CLAIMS_PIPE",
            ..Default::default()
        };
        let loader = StagedLoader::new(
            Box::new(JsonLinesWriter),
            Box::new(LocalStage::new(stage_root)),
            Box::new(orders.clone()),
            Box::new(claims.clone()),
            batch_size,
        )
        .unwrap();
        (loader, orders, claims)
    }

    fn order(i: usize) -> Value {
        json!({"order_id": format!("O{i}"), "customer_id": "C1", "quantity": 1})
    }

    fn claim(i: usize) -> Value {
        json!({"claim_id": format!("R{i}"), "return_date": "2025-01-01", "return_reason": "strap"})
    }

    #[test]
    fn test_batches_flush_at_batch_size() {
        let dir = tempfile::tempdir().unwrap();
        let (mut loader, orders, claims) = loader(dir.path(), 3);
        for i in 0..7 {
            loader.push(&order(i)).unwrap();
        }
        for i in 0..2 {
            loader.push(&claim(i)).unwrap();
        }
        loader.push(&json!({"foo": 1})).unwrap();
        assert_eq!(orders.submitted.borrow().len(), 2);
        assert!(claims.submitted.borrow().is_empty());

        let report = loader.finish().unwrap();
        assert_eq!(report.orders, 7);
        assert_eq!(report.claims, 2);
        assert_eq!(report.unknown, 1);
        assert_eq!(report.files.len(), 4);
        assert_eq!(orders.submitted.borrow().len(), 3);
        assert_eq!(claims.submitted.borrow().len(), 1);

        for name in orders.submitted.borrow().iter() {
            assert!(name.starts_with("orders_") && name.ends_with(".jsonl"));
            assert!(dir.path().join("ARBORE_ORDERS").join(name).exists());
        }
        let claim_file = &claims.submitted.borrow()[0];
        let text =
            std::fs::read_to_string(dir.path().join("ARBORE_WARRANTY_CLAIMS").join(claim_file)).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("{\"CLAIM_ID\":\"R0\""));
    }

    #[test]
    fn test_unknown_records_warned_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("warn.log");
        let log = std::fs::File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(log))
            .finish();

        let (mut loader, orders, claims) = loader(dir.path(), 10);
        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(loader.push(&json!({"foo": 1})).unwrap(), RecordKind::Unknown);
            assert_eq!(loader.push(&json!(42)).unwrap(), RecordKind::Unknown);
        });
        let report = loader.finish().unwrap();
        assert_eq!(report.unknown, 2);
        assert!(orders.submitted.borrow().is_empty());
        assert!(claims.submitted.borrow().is_empty());

        let text = std::fs::read_to_string(&log_path).unwrap();
        let warnings: Vec<&str> = text
            .lines()
            .filter(|line| line.contains("WARN") && line.contains("unknown record type skipped"))
            .collect();
        assert_eq!(warnings.len(), 2, "{text}");
    }

    #[test]
    fn test_empty_input_submits_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (loader, orders, _) = loader(dir.path(), 10);
        let report = loader.finish().unwrap();
        assert_eq!(report, StagedReport::default());
        assert!(orders.submitted.borrow().is_empty());
    }

    #[test]
    fn test_flush_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let failing = RecordingPipe {
            name: "ORDERS_PIPE",
            fail: true,
            ..Default::default()
        };
        let mut loader = StagedLoader::new(
            Box::new(JsonLinesWriter),
            Box::new(LocalStage::new(dir.path())),
            Box::new(failing),
            Box::new(RecordingPipe::default()),
            1,
        )
        .unwrap();
        assert!(loader.push(&order(0)).is_err());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = StagedLoader::new(
            Box::new(JsonLinesWriter),
            Box::new(LocalStage::new(dir.path())),
            Box::new(RecordingPipe::default()),
            Box::new(RecordingPipe::default()),
            0,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_stage_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("claims.json");
        let records: Vec<Value> = (0..5).map(claim).collect();
        std::fs::write(&input, serde_json::to_vec(&records).unwrap()).unwrap();
        let (loader, _, claims) = loader(&dir.path().join("stage"), 2);
        let report = loader.stage_json_file(&input).unwrap();
        assert_eq!(report.claims, 5);
        assert_eq!(claims.submitted.borrow().len(), 3);
    }
}

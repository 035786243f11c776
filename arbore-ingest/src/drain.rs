//! Out-of-band pipe drain: load every queued staged file into its table.
//!
//! Each file loads inside its own transaction, so a bad file leaves no
//! partial rows behind and is marked `LOAD_FAILED` while the drain moves on.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::BufRead;

use crate::error::{IngestError, Result};
use crate::rows::{PIPE_HISTORY_TABLE, TableSpec};
use crate::stage::{LOAD_FAILED, LOADED, LocalStage, QUEUED};
use crate::warehouse::Session;

/// What happened to one queued file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainedFile {
    pub pipe_name: String,
    pub file_name: String,
    pub status: String,
    pub rows_parsed: usize,
    pub rows_loaded: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    pub files: Vec<DrainedFile>,
}

impl DrainReport {
    pub fn loaded(&self) -> usize {
        self.files.iter().filter(|f| f.status == LOADED).count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.status == LOAD_FAILED).count()
    }

    pub fn rows_loaded(&self) -> usize {
        self.files.iter().map(|f| f.rows_loaded).sum()
    }
}

fn text(cell: Option<&Value>) -> String {
    match cell {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Load the rows of one staged file. Returns (rows parsed, rows loaded).
fn load_file<S: Session + ?Sized>(
    session: &mut S,
    stage: &LocalStage,
    table: &TableSpec,
    file_name: &str,
) -> Result<(usize, usize)> {
    let path = stage.file_path(table.table, file_name);
    let reader = std::io::BufReader::new(std::fs::File::open(&path)?);

    let mut parsed = 0;
    let mut loaded = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let Value::Object(object) = serde_json::from_str::<Value>(&line)? else {
            return Err(IngestError::stage(format!(
                "{file_name}: line {} is not an object",
                parsed + 1
            )));
        };
        parsed += 1;
        loaded += session.execute(table.insert_sql, &table.row_from_columns(&object))?;
    }
    Ok((parsed, loaded))
}

/// Load every `QUEUED` file recorded in the pipe history, oldest first.
pub fn drain_pipes<S: Session + ?Sized>(session: &mut S, stage: &LocalStage) -> Result<DrainReport> {
    let queued = session.query(
        &format!(
            "SELECT ID, PIPE_NAME, TABLE_NAME, FILE_NAME FROM {PIPE_HISTORY_TABLE} \
             WHERE STATUS = ? ORDER BY ID"
        ),
        &[Value::from(QUEUED)],
    )?;
    let update = format!(
        "UPDATE {PIPE_HISTORY_TABLE} \
         SET STATUS = ?, ROWS_PARSED = ?, ROWS_LOADED = ?, LOAD_TIME = ?, ERROR = ? \
         WHERE ID = ?"
    );

    let mut report = DrainReport::default();
    for row in queued {
        let id = row.first().cloned().unwrap_or(Value::Null);
        let pipe_name = text(row.get(1));
        let table_name = text(row.get(2));
        let file_name = text(row.get(3));

        let outcome = match TableSpec::for_table(&table_name) {
            Some(table) => {
                session.execute("BEGIN", &[])?;
                match load_file(session, stage, &table, &file_name) {
                    Ok(counts) => {
                        session.execute("COMMIT", &[])?;
                        Ok(counts)
                    }
                    Err(e) => {
                        session.execute("ROLLBACK", &[])?;
                        Err(e)
                    }
                }
            }
            None => Err(IngestError::stage(format!("unknown target table {table_name}"))),
        };

        let drained = match outcome {
            Ok((parsed, loaded)) => {
                tracing::info!(pipe = %pipe_name, file = %file_name, rows = loaded, "staged file loaded");
                DrainedFile {
                    pipe_name,
                    file_name,
                    status: LOADED.to_string(),
                    rows_parsed: parsed,
                    rows_loaded: loaded,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(pipe = %pipe_name, file = %file_name, error = %e, "staged file failed to load");
                DrainedFile {
                    pipe_name,
                    file_name,
                    status: LOAD_FAILED.to_string(),
                    rows_parsed: 0,
                    rows_loaded: 0,
                    error: Some(e.to_string()),
                }
            }
        };

        session.execute(
            &update,
            &[
                Value::from(drained.status.as_str()),
                Value::from(drained.rows_parsed),
                Value::from(drained.rows_loaded),
                Value::from(Utc::now().to_rfc3339()),
                drained.error.clone().map_or(Value::Null, Value::from),
                id,
            ],
        )?;
        report.files.push(drained);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{CLAIMS, ORDERS, order_row};
    use crate::sqlite::SqliteWarehouse;
    use crate::stage::{IngestPipe, JsonLinesWriter, LocalPipe, StageArea, StageFileWriter};
    use crate::warehouse::{Warehouse, query_count};
    use serde_json::json;
    use tempfile::TempDir;

    fn queue_file(
        dir: &TempDir,
        wh: &SqliteWarehouse,
        stage: &LocalStage,
        table: TableSpec,
        name: &str,
        rows: &[Vec<Value>],
    ) {
        let local = dir.path().join(name);
        JsonLinesWriter.write_batch(&local, table.columns, rows).unwrap();
        let staged = stage.put(&local, table.table).unwrap();
        let mut pipe = LocalPipe::new("INGEST.INGEST.TEST_PIPE", table.table, wh.connect().unwrap());
        pipe.ingest_files(&[staged]).unwrap();
        pipe.close().unwrap();
    }

    #[test]
    fn test_drain_loads_queued_files_once() {
        let dir = TempDir::new().unwrap();
        let wh = SqliteWarehouse::new(dir.path().join("wh.db"), "test");
        let stage = LocalStage::new(dir.path().join("stage"));

        let rows: Vec<Vec<Value>> = (0..4)
            .map(|i| {
                let record = json!({"order_id": format!("O{i}"), "customer_id": "C1", "quantity": "two"});
                order_row(record.as_object().unwrap())
            })
            .collect();
        queue_file(&dir, &wh, &stage, ORDERS, "orders_1.jsonl", &rows);

        let mut s = wh.connect().unwrap();
        let report = drain_pipes(&mut s, &stage).unwrap();
        assert_eq!(report.loaded(), 1);
        assert_eq!(report.rows_loaded(), 4);
        assert_eq!(query_count(&mut s, "SELECT COUNT(*) FROM ARBORE_ORDERS").unwrap(), 4);

        let again = drain_pipes(&mut s, &stage).unwrap();
        assert!(again.files.is_empty());
        assert_eq!(query_count(&mut s, "SELECT COUNT(*) FROM ARBORE_ORDERS").unwrap(), 4);

        let history = s
            .query("SELECT STATUS, ROWS_PARSED, ROWS_LOADED FROM ARBORE_PIPE_HISTORY", &[])
            .unwrap();
        assert_eq!(history, vec![vec![json!("LOADED"), json!(4), json!(4)]]);
    }

    #[test]
    fn test_bad_file_is_marked_failed_and_rolled_back() {
        let dir = TempDir::new().unwrap();
        let wh = SqliteWarehouse::new(dir.path().join("wh.db"), "test");
        let stage = LocalStage::new(dir.path().join("stage"));

        let claim = vec![json!("R1"); 8];
        queue_file(&dir, &wh, &stage, CLAIMS, "claims_ok.jsonl", &[claim]);

        let empty_order = ORDERS.row_from_columns(&Default::default());
        // PARSE_JSON rejects a quantity that is not JSON text.
        let mut broken = empty_order.clone();
        broken[0] = json!("O1");
        broken[3] = json!("two");
        queue_file(&dir, &wh, &stage, ORDERS, "orders_bad.jsonl", &[empty_order, broken]);

        let mut s = wh.connect().unwrap();
        let report = drain_pipes(&mut s, &stage).unwrap();
        assert_eq!(report.loaded(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.files[1].file_name, "orders_bad.jsonl");
        assert!(report.files[1].error.is_some());
        assert_eq!(query_count(&mut s, "SELECT COUNT(*) FROM ARBORE_ORDERS").unwrap(), 0);
        assert_eq!(
            query_count(&mut s, "SELECT COUNT(*) FROM ARBORE_WARRANTY_CLAIMS").unwrap(),
            1
        );
    }

    #[test]
    fn test_missing_staged_file_fails() {
        let dir = TempDir::new().unwrap();
        let wh = SqliteWarehouse::new(dir.path().join("wh.db"), "test");
        let stage = LocalStage::new(dir.path().join("stage"));
        queue_file(&dir, &wh, &stage, ORDERS, "orders_gone.jsonl", &[]);
        std::fs::remove_file(stage.file_path("ARBORE_ORDERS", "orders_gone.jsonl")).unwrap();

        let mut s = wh.connect().unwrap();
        let report = drain_pipes(&mut s, &stage).unwrap();
        assert_eq!(report.failed(), 1);
    }
}

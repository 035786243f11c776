//! Pipe status report: landing table row counts and recent pipe history.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::rows::{CLAIMS_TABLE, ORDERS_TABLE, PIPE_HISTORY_TABLE};
use crate::warehouse::{Session, query_count};

pub const RECENT_HISTORY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub pipe_name: String,
    pub file_name: String,
    pub status: String,
    pub file_size: Option<i64>,
    pub rows_loaded: Option<i64>,
    pub rows_parsed: Option<i64>,
    pub load_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeStatus {
    pub orders: i64,
    pub claims: i64,
    pub history: Vec<HistoryRow>,
}

fn cell_string(row: &[Value], i: usize) -> Option<String> {
    match row.get(i)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn cell_int(row: &[Value], i: usize) -> Option<i64> {
    row.get(i).and_then(Value::as_i64)
}

/// Row counts plus the `limit` most recent pipe history entries, newest
/// first. Entries not loaded yet sort by the time they were queued.
pub fn pipe_status<S: Session + ?Sized>(session: &mut S, limit: usize) -> Result<PipeStatus> {
    let orders = query_count(session, &format!("SELECT COUNT(*) FROM {ORDERS_TABLE}"))?;
    let claims = query_count(session, &format!("SELECT COUNT(*) FROM {CLAIMS_TABLE}"))?;

    let rows = session.query(
        &format!(
            "SELECT PIPE_NAME, FILE_NAME, STATUS, FILE_SIZE, ROWS_LOADED, ROWS_PARSED, LOAD_TIME \
             FROM {PIPE_HISTORY_TABLE} \
             ORDER BY COALESCE(LOAD_TIME, QUEUED_AT) DESC, ID DESC \
             LIMIT ?"
        ),
        &[Value::from(limit)],
    )?;
    let history = rows
        .iter()
        .map(|row| HistoryRow {
            pipe_name: cell_string(row, 0).unwrap_or_default(),
            file_name: cell_string(row, 1).unwrap_or_default(),
            status: cell_string(row, 2).unwrap_or_default(),
            file_size: cell_int(row, 3),
            rows_loaded: cell_int(row, 4),
            rows_parsed: cell_int(row, 5),
            load_time: cell_string(row, 6),
        })
        .collect();

    Ok(PipeStatus {
        orders,
        claims,
        history,
    })
}

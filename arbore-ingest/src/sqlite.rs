//! Local warehouse backed by a SQLite file.
//!
//! Creates the two landing tables plus the pipe history table on connect,
//! and registers a `PARSE_JSON` scalar so the insert statements run
//! unchanged against it.

use rusqlite::functions::FunctionFlags;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use serde_json::{Number, Value};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::warehouse::{Session, Warehouse};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ARBORE_ORDERS (
    ORDER_ID     TEXT,
    CUSTOMER_ID  TEXT,
    PRODUCT_ID   TEXT,
    QUANTITY     TEXT,
    ORDER_DATE   TEXT,
    ORDER_NOTES  TEXT
);
CREATE TABLE IF NOT EXISTS ARBORE_WARRANTY_CLAIMS (
    CLAIM_ID       TEXT,
    ORDER_ID       TEXT,
    PRODUCT_ID     TEXT,
    ORDER_DATE     TEXT,
    RETURN_DATE    TEXT,
    RETURN_REASON  TEXT,
    SEVERITY       TEXT,
    UNDER_WARRANTY TEXT
);
CREATE TABLE IF NOT EXISTS ARBORE_PIPE_HISTORY (
    ID           INTEGER PRIMARY KEY AUTOINCREMENT,
    PIPE_NAME    TEXT NOT NULL,
    TABLE_NAME   TEXT NOT NULL,
    FILE_NAME    TEXT NOT NULL,
    STATUS       TEXT NOT NULL,
    FILE_SIZE    INTEGER,
    ROWS_PARSED  INTEGER,
    ROWS_LOADED  INTEGER,
    QUEUED_AT    TEXT NOT NULL,
    LOAD_TIME    TEXT,
    ERROR        TEXT
);
";

/// A warehouse stored in a single SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteWarehouse {
    path: PathBuf,
    query_tag: String,
}

impl SqliteWarehouse {
    pub fn new(path: impl Into<PathBuf>, query_tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query_tag: query_tag.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Warehouse for SqliteWarehouse {
    type Session = SqliteSession;

    fn connect(&self) -> Result<SqliteSession> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        register_parse_json(&conn)?;
        conn.execute_batch(SCHEMA)?;
        tracing::info!(
            database = %self.path.display(),
            query_tag = %self.query_tag,
            "warehouse session opened"
        );
        Ok(SqliteSession { conn })
    }
}

fn register_parse_json(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "PARSE_JSON",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            let Some(text) = text else {
                return Ok(None);
            };
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| rusqlite::Error::UserFunctionError(Box::new(e)))?;
            Ok(if value.is_null() {
                None
            } else {
                Some(value.to_string())
            })
        },
    )
}

pub struct SqliteSession {
    conn: Connection,
}

impl std::fmt::Debug for SqliteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSession")
            .field("path", &self.conn.path())
            .finish()
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Text(b.to_string()),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => n.as_f64().map_or(SqlValue::Null, SqlValue::Real),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    }
}

impl Session for SqliteSession {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize> {
        let affected = self.conn.execute(sql, params_from_iter(params.iter().map(to_sql)))?;
        Ok(affected)
    }

    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let width = stmt.column_count();
        let rows = stmt.query_map(params_from_iter(params.iter().map(to_sql)), |row| {
            (0..width)
                .map(|i| row.get_ref(i).map(from_sql))
                .collect::<rusqlite::Result<Vec<Value>>>()
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| e)?;
        tracing::debug!("warehouse session closed");
        Ok(())
    }
}

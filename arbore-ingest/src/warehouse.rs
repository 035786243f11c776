//! The warehouse collaborator.
//!
//! Loaders only need to open a session, run parameterized statements and
//! read small result sets. Parameters and result cells are plain JSON values;
//! each backend maps them onto its own types.

use serde_json::Value;

use crate::error::Result;

/// Something that hands out sessions.
pub trait Warehouse {
    type Session: Session;

    fn connect(&self) -> Result<Self::Session>;
}

/// An open connection. Statements are committed as they run.
pub trait Session {
    /// Run one statement with positional `?` parameters. Returns the number
    /// of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<usize>;

    /// Run a query and collect every row.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>>;

    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Read a single integer cell, e.g. from `SELECT COUNT(*)`.
pub fn query_count<S: Session + ?Sized>(session: &mut S, sql: &str) -> Result<i64> {
    let rows = session.query(sql, &[])?;
    Ok(rows
        .first()
        .and_then(|row| row.first())
        .and_then(Value::as_i64)
        .unwrap_or(0))
}

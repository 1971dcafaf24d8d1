//! rusqlite-backed implementation of the statement layer.
//!
//! Prepares, binds `@pN` parameters, and steps statements. Each stepped row
//! is buffered into owned [`Value`]s so the cursor can hand out column
//! accessors without borrowing the engine's transient row.

use rusqlite::types::ValueRef;
use rusqlite::Connection;

use super::{ExecuteError, ExecuteResult, RowCursor};
use crate::value::Value;

pub(crate) fn engine_error(err: rusqlite::Error) -> ExecuteError {
    match &err {
        rusqlite::Error::SqliteFailure(code, message) => ExecuteError::Engine {
            code: code.extended_code,
            message: message
                .clone()
                .unwrap_or_else(|| format!("{:?}", code.code)),
        },
        other => ExecuteError::Statement(other.to_string()),
    }
}

fn to_engine_value(value: &Value) -> rusqlite::types::Value {
    match value {
        Value::Null => rusqlite::types::Value::Null,
        Value::Integer(i) => rusqlite::types::Value::Integer(*i),
        Value::Real(f) => rusqlite::types::Value::Real(*f),
        Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
        Value::Blob(b) => rusqlite::types::Value::Blob(b.clone()),
    }
}

fn from_engine_value(column: &str, value: ValueRef<'_>) -> ExecuteResult<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => match std::str::from_utf8(t) {
            Ok(s) => Value::Text(s.to_owned()),
            Err(_) => {
                return Err(ExecuteError::InvalidText {
                    column: column.to_owned(),
                })
            }
        },
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    })
}

fn bind(stmt: &mut rusqlite::Statement<'_>, params: &[(String, Value)]) -> ExecuteResult<()> {
    for (name, value) in params {
        let idx = stmt
            .parameter_index(name)
            .map_err(engine_error)?
            .ok_or_else(|| ExecuteError::UnknownParameter(name.clone()))?;
        stmt.raw_bind_parameter(idx, to_engine_value(value))
            .map_err(engine_error)?;
    }
    Ok(())
}

/// Prepare, bind, and run a statement that returns no rows.
/// Returns the number of affected rows.
pub(crate) fn execute(
    conn: &Connection,
    sql: &str,
    params: &[(String, Value)],
) -> ExecuteResult<usize> {
    let mut stmt = conn.prepare(sql).map_err(engine_error)?;
    bind(&mut stmt, params)?;
    stmt.raw_execute().map_err(engine_error)
}

/// Run one prepared statement once per parameter set, returning the last
/// inserted rowid after each execution. The caller owns transaction scope.
pub(crate) fn insert_batch(
    conn: &Connection,
    sql: &str,
    batches: &[Vec<(String, Value)>],
) -> ExecuteResult<Vec<i64>> {
    let mut stmt = conn.prepare(sql).map_err(engine_error)?;
    let mut keys = Vec::with_capacity(batches.len());
    for params in batches {
        bind(&mut stmt, params)?;
        stmt.raw_execute().map_err(engine_error)?;
        keys.push(conn.last_insert_rowid());
    }
    Ok(keys)
}

/// Prepare, bind, and hand a forward-only cursor to `consume`.
///
/// The prepared statement lives exactly as long as the closure call, so the
/// cursor's resources are released on every exit path.
pub(crate) fn query<R>(
    conn: &Connection,
    sql: &str,
    params: &[(String, Value)],
    consume: impl FnOnce(&mut dyn RowCursor) -> Result<R, crate::Error>,
) -> Result<R, crate::Error> {
    let mut stmt = conn.prepare(sql).map_err(engine_error)?;
    bind(&mut stmt, params)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let rows = stmt.raw_query();
    let mut cursor = SqliteCursor {
        rows,
        columns,
        current: Vec::new(),
    };
    consume(&mut cursor)
}

struct SqliteCursor<'s> {
    rows: rusqlite::Rows<'s>,
    columns: Vec<String>,
    current: Vec<Value>,
}

impl RowCursor for SqliteCursor<'_> {
    fn step(&mut self) -> ExecuteResult<bool> {
        match self.rows.next().map_err(engine_error)? {
            Some(row) => {
                self.current.clear();
                for idx in 0..self.columns.len() {
                    let cell = row.get_ref(idx).map_err(engine_error)?;
                    self.current.push(from_engine_value(&self.columns[idx], cell)?);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row(&self) -> &[Value] {
        &self.current
    }
}

// ============================================================================
// Tests
// ============================================================================

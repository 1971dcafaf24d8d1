//! Statement execution layer.
//!
//! Everything above this module is engine-agnostic: the translator and
//! emitter produce SQL text plus named parameters, and the materializer
//! consumes rows through the [`RowCursor`] contract. Only [`sqlite`] knows
//! the embedded engine's API.

pub mod sqlite;

use crate::value::{StorageClass, Value};

/// Errors reported by the embedded engine.
///
/// Engine result codes are preserved as-is and never retried here; busy and
/// locked conditions are the caller's policy decision.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("engine error (code {code}): {message}")]
    Engine { code: i32, message: String },

    #[error("statement error: {0}")]
    Statement(String),

    #[error("statement has no parameter named {0}")]
    UnknownParameter(String),

    #[error("column {column} holds text that is not valid UTF-8")]
    InvalidText { column: String },
}

pub type ExecuteResult<T> = Result<T, ExecuteError>;

/// A single-owner, forward-only cursor over a statement's result rows.
///
/// `step` advances to the next row; column accessors read the current row.
/// The cursor is non-restartable, and its underlying prepared statement is
/// released when the cursor is dropped.
pub trait RowCursor {
    /// Advance to the next row. Returns `false` when the statement is done.
    fn step(&mut self) -> ExecuteResult<bool>;

    /// Result column names, in result order.
    fn columns(&self) -> &[String];

    /// The current row's values. Only valid after `step` returned `true`.
    fn row(&self) -> &[Value];

    fn column_count(&self) -> usize {
        self.columns().len()
    }

    fn column_name(&self, idx: usize) -> &str {
        &self.columns()[idx]
    }

    fn column_type(&self, idx: usize) -> StorageClass {
        self.row()[idx].storage_class()
    }

    fn column_value(&self, idx: usize) -> &Value {
        &self.row()[idx]
    }
}

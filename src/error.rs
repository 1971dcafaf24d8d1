//! Crate-level error type.

use crate::engine::ExecuteError;
use crate::materialize::MaterializeError;
use crate::schema::SchemaError;
use crate::translate::TranslateError;

/// A terminal expected a different number of rows than the statement
/// produced.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CardinalityError {
    #[error("the sequence contains no rows")]
    NoRows,

    #[error("the sequence contains more than one row")]
    MoreThanOne,
}

/// Anything that can go wrong between a query handle and its result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Cardinality(#[from] CardinalityError),

    #[error("background task failed: {0}")]
    Task(String),
}

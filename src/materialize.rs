//! Row materialization.
//!
//! Result rows reach the caller through [`RowView`], a by-name and positional
//! window over the cursor's current row. [`FromRow`] turns a view into an
//! output value; nested objects use the dotted-prefix column convention
//! (`author.name` is the `name` member of the `author` projection).

use std::marker::PhantomData;

use crate::engine::RowCursor;
use crate::value::{ConvertError, FromValue, Value};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error("result set has no column named {0}")]
    MissingColumn(String),

    #[error("result set has no column at index {0}")]
    BadIndex(usize),

    #[error("column {column}: {source}")]
    Convert {
        column: String,
        #[source]
        source: ConvertError,
    },
}

pub type MaterializeResult<T> = Result<T, MaterializeError>;

// ============================================================================
// RowView
// ============================================================================

/// A read-only window over the current cursor row.
///
/// Carries a dotted prefix so nested projections can be read through the same
/// by-name accessors: a view with prefix `author.` resolves `name` against
/// the `author.name` result column.
pub struct RowView<'r> {
    columns: &'r [String],
    values: &'r [Value],
    prefix: String,
}

impl<'r> RowView<'r> {
    pub fn new(columns: &'r [String], values: &'r [Value]) -> Self {
        Self {
            columns,
            values,
            prefix: String::new(),
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| {
            c.len() == self.prefix.len() + name.len()
                && c.starts_with(&self.prefix)
                && c.ends_with(name)
        })
    }

    /// Read a column by name, relative to this view's prefix.
    pub fn get<V: FromValue>(&self, name: &str) -> MaterializeResult<V> {
        let idx = self
            .find(name)
            .ok_or_else(|| MaterializeError::MissingColumn(format!("{}{name}", self.prefix)))?;
        V::from_value(&self.values[idx]).map_err(|source| MaterializeError::Convert {
            column: format!("{}{name}", self.prefix),
            source,
        })
    }

    /// Read a column by absolute result position.
    pub fn get_at<V: FromValue>(&self, idx: usize) -> MaterializeResult<V> {
        let value = self.values.get(idx).ok_or(MaterializeError::BadIndex(idx))?;
        V::from_value(value).map_err(|source| MaterializeError::Convert {
            column: self.columns[idx].clone(),
            source,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// A sub-view whose reads resolve under `member.`.
    pub fn member(&self, member: &str) -> RowView<'r> {
        RowView {
            columns: self.columns,
            values: self.values,
            prefix: format!("{}{member}.", self.prefix),
        }
    }

    /// Materialize a nested object under `member.`.
    ///
    /// Returns `None` when no prefixed column exists, or when every prefixed
    /// column holds NULL (an unmatched outer join). A default-initialized
    /// object is never fabricated.
    pub fn nested<T: FromRow>(&self, member: &str) -> MaterializeResult<Option<T>> {
        let prefix = format!("{}{member}.", self.prefix);
        let mut any_column = false;
        let mut any_value = false;
        for (idx, column) in self.columns.iter().enumerate() {
            if column.starts_with(&prefix) {
                any_column = true;
                if !self.values[idx].is_null() {
                    any_value = true;
                    break;
                }
            }
        }
        if !any_column || !any_value {
            return Ok(None);
        }
        T::from_row(&self.member(member)).map(Some)
    }
}

// ============================================================================
// FromRow
// ============================================================================

/// Construct an output value from the current row.
pub trait FromRow: Sized {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self>;
}

macro_rules! scalar_from_row {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
                    row.get_at(0)
                }
            }
        )*
    };
}

scalar_from_row!(
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    bool,
    f32,
    f64,
    String,
    Vec<u8>,
    uuid::Uuid,
    crate::value::Timestamp,
    Value,
);

impl<T: FromValue> FromRow for Option<T> {
    fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
        row.get_at(0)
    }
}

macro_rules! tuple_from_row {
    ($(($($name:ident : $idx:tt),+)),* $(,)?) => {
        $(
            impl<$($name: FromValue),+> FromRow for ($($name,)+) {
                fn from_row(row: &RowView<'_>) -> MaterializeResult<Self> {
                    Ok(($(row.get_at::<$name>($idx)?,)+))
                }
            }
        )*
    };
}

tuple_from_row!(
    (A: 0, B: 1),
    (A: 0, B: 1, C: 2),
    (A: 0, B: 1, C: 2, D: 3),
    (A: 0, B: 1, C: 2, D: 3, E: 4),
    (A: 0, B: 1, C: 2, D: 3, E: 4, F: 5),
);

// ============================================================================
// RowIter
// ============================================================================

/// Lazy single-pass iterator over a cursor.
///
/// The first cursor error finishes the iterator after yielding it.
pub struct RowIter<'c, O: FromRow> {
    cursor: &'c mut dyn RowCursor,
    finished: bool,
    _out: PhantomData<O>,
}

impl<'c, O: FromRow> RowIter<'c, O> {
    pub fn new(cursor: &'c mut dyn RowCursor) -> Self {
        Self {
            cursor,
            finished: false,
            _out: PhantomData,
        }
    }
}

impl<O: FromRow> Iterator for RowIter<'_, O> {
    type Item = Result<O, crate::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.cursor.step() {
            Err(err) => {
                self.finished = true;
                Some(Err(err.into()))
            }
            Ok(false) => {
                self.finished = true;
                None
            }
            Ok(true) => {
                let view = RowView::new(self.cursor.columns(), self.cursor.row());
                Some(O::from_row(&view).map_err(Into::into))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! A typed, lazy query layer that compiles to parameterized SQLite SQL.
//!
//! Queries are immutable operator trees built through [`Query`] handles.
//! A terminal call compiles the tree, executes the statement under the
//! connection's execution lock, and materializes rows back into typed
//! values:
//!
//! ```text
//!   Query<T, Out> --operators--> tree --translate--> SqlModel --emit--> CompiledQuery
//!         ^                                                                  |
//!         |                                                              execute
//!   materialize <---- RowView <---- RowCursor <---- rusqlite statement <-----+
//! ```
//!
//! Constants always travel as bound parameters; user values never appear in
//! SQL text. Schema metadata is declared ahead of time through
//! [`schema::Entity`] descriptors and cached per type.

pub mod db;
pub mod engine;
pub mod error;
pub mod expr;
pub mod materialize;
pub mod query;
pub mod schema;
pub mod sql;
mod task;
pub mod translate;
pub mod value;

pub use db::Database;
pub use error::{CardinalityError, Error};
pub use query::{Query, SelectItem};

/// The common surface, one `use` away.
pub mod prelude {
    pub use crate::db::Database;
    pub use crate::error::{CardinalityError, Error};
    pub use crate::expr::{col, col_of, null, val, DateUnit, Expr, ExprExt};
    pub use crate::materialize::{FromRow, MaterializeResult, RowView};
    pub use crate::query::{Query, SelectItem};
    pub use crate::schema::{
        ColumnDescriptor, DeclaredType, Entity, TableDescriptor,
    };
    pub use crate::value::{FromValue, StorageClass, Timestamp, Value};
}

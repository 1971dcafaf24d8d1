//! The database handle.
//!
//! One rusqlite connection behind a mutex, the execution lock. Every
//! statement acquires the lock for exactly its own duration; nothing holds
//! it across user code. Handles are cheap clones sharing the connection.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::engine::sqlite as engine;
use crate::engine::RowCursor;
use crate::error::Error;
use crate::materialize::RowView;
use crate::query::Query;
use crate::schema::ddl;
use crate::schema::{mapping, Entity, TableMapping};
use crate::sql::quote_ident;
use crate::value::Value;

#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(engine::engine_error)?;
        Ok(Self::wrap(conn))
    }

    pub fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(engine::engine_error)?;
        Ok(Self::wrap(conn))
    }

    fn wrap(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
            }),
        }
    }

    /// A lazy query handle over `T`'s table. No I/O happens until a
    /// terminal runs.
    pub fn table<T: Entity>(&self) -> Query<T> {
        Query::new(self.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A poisoned lock means a panic mid-statement elsewhere; the
        // connection itself is still usable.
        self.inner.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn execute_sql(
        &self,
        sql: &str,
        params: &[(String, Value)],
    ) -> Result<usize, Error> {
        let conn = self.lock();
        Ok(engine::execute(&conn, sql, params)?)
    }

    pub(crate) fn with_cursor<R>(
        &self,
        sql: &str,
        params: &[(String, Value)],
        consume: impl FnOnce(&mut dyn RowCursor) -> Result<R, Error>,
    ) -> Result<R, Error> {
        let conn = self.lock();
        engine::query(&conn, sql, params, consume)
    }

    // ========================================================================
    // DDL
    // ========================================================================

    /// Create `T`'s table and all of its declared indexes.
    pub fn create_table<T: Entity>(&self) -> Result<(), Error> {
        let mapping = mapping::<T>()?;
        let conn = self.lock();
        engine::execute(&conn, &ddl::create_table(&mapping), &[])?;
        for sql in ddl::create_indexes(&mapping) {
            engine::execute(&conn, &sql, &[])?;
        }
        Ok(())
    }

    pub fn drop_table<T: Entity>(&self) -> Result<(), Error> {
        let mapping = mapping::<T>()?;
        self.execute_sql(&ddl::drop_table(&mapping), &[])?;
        Ok(())
    }

    // ========================================================================
    // Direct row operations
    // ========================================================================

    /// Insert one row. Returns the rowid; an auto-increment key is written
    /// back through [`Entity::key_assigned`].
    pub fn insert<T: Entity>(&self, row: &mut T) -> Result<i64, Error> {
        let mapping = mapping::<T>()?;
        let (sql, params) = insert_statement(&mapping, row);
        let conn = self.lock();
        engine::execute(&conn, &sql, &params)?;
        let key = conn.last_insert_rowid();
        drop(conn);
        if mapping.primary_key().auto_increment {
            row.key_assigned(key);
        }
        Ok(key)
    }

    /// Insert many rows inside one transaction, under one lock section.
    /// Any failure rolls the whole batch back.
    pub fn insert_all<T: Entity>(&self, rows: &mut [T]) -> Result<usize, Error> {
        if rows.is_empty() {
            return Ok(0);
        }
        let mapping = mapping::<T>()?;
        let sql = insert_sql(&mapping);
        let batches: Vec<Vec<(String, Value)>> =
            rows.iter().map(|row| insert_params(&mapping, row)).collect();

        let conn = self.lock();
        engine::execute(&conn, "BEGIN", &[])?;
        let keys = match engine::insert_batch(&conn, &sql, &batches) {
            Ok(keys) => keys,
            Err(err) => {
                let _ = engine::execute(&conn, "ROLLBACK", &[]);
                return Err(err.into());
            }
        };
        engine::execute(&conn, "COMMIT", &[])?;
        drop(conn);

        if mapping.primary_key().auto_increment {
            for (row, key) in rows.iter_mut().zip(keys) {
                row.key_assigned(key);
            }
        }
        Ok(rows.len())
    }

    /// Update every column of the row identified by its primary key.
    pub fn update_row<T: Entity>(&self, row: &T) -> Result<usize, Error> {
        let mapping = mapping::<T>()?;
        let values = row.values();
        let pk = mapping.primary_key();

        let mut sql = format!("UPDATE {} SET ", quote_ident(&mapping.table));
        let mut params = Vec::new();
        let mut n = 0;
        for (column, value) in mapping.columns.iter().zip(&values) {
            if column.primary_key {
                continue;
            }
            if n > 0 {
                sql.push_str(", ");
            }
            n += 1;
            let name = format!("@p{n}");
            sql.push_str(&format!("{} = {name}", quote_ident(&column.name)));
            params.push((name, value.clone()));
        }
        let key_name = format!("@p{}", n + 1);
        sql.push_str(&format!(" WHERE {} = {key_name}", quote_ident(&pk.name)));
        let key_idx = mapping.columns.iter().position(|c| c.primary_key).unwrap_or(0);
        params.push((key_name, values[key_idx].clone()));

        self.execute_sql(&sql, &params)
    }

    /// Delete the row identified by this row's primary key.
    pub fn delete_row<T: Entity>(&self, row: &T) -> Result<usize, Error> {
        let mapping = mapping::<T>()?;
        let key_idx = mapping.columns.iter().position(|c| c.primary_key).unwrap_or(0);
        let key = row.values().swap_remove(key_idx);
        self.delete_mapped_key(&mapping, key)
    }

    pub fn delete_by_key<T: Entity>(&self, key: impl Into<Value>) -> Result<usize, Error> {
        let mapping = mapping::<T>()?;
        self.delete_mapped_key(&mapping, key.into())
    }

    fn delete_mapped_key(&self, mapping: &TableMapping, key: Value) -> Result<usize, Error> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = @p1",
            quote_ident(&mapping.table),
            quote_ident(&mapping.primary_key().name),
        );
        self.execute_sql(&sql, &[("@p1".to_string(), key)])
    }

    /// Fetch one row by primary key.
    pub fn get<T: Entity>(&self, key: impl Into<Value>) -> Result<Option<T>, Error> {
        let mapping = mapping::<T>()?;
        let columns = mapping
            .columns
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {columns} FROM {} WHERE {} = @p1 LIMIT 1",
            quote_ident(&mapping.table),
            quote_ident(&mapping.primary_key().name),
        );
        let params = [("@p1".to_string(), key.into())];
        self.with_cursor(&sql, &params, |cursor| {
            if cursor.step()? {
                let view = RowView::new(cursor.columns(), cursor.row());
                Ok(Some(T::from_row(&view)?))
            } else {
                Ok(None)
            }
        })
    }
}

fn insert_sql(mapping: &TableMapping) -> String {
    let mut names = Vec::new();
    let mut slots = Vec::new();
    let mut n = 0;
    for column in &mapping.columns {
        if column.auto_increment {
            continue;
        }
        n += 1;
        names.push(quote_ident(&column.name));
        slots.push(format!("@p{n}"));
    }
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&mapping.table),
        names.join(", "),
        slots.join(", "),
    )
}

fn insert_params<T: Entity>(mapping: &TableMapping, row: &T) -> Vec<(String, Value)> {
    let mut params = Vec::new();
    let mut n = 0;
    for (column, value) in mapping.columns.iter().zip(row.values()) {
        if column.auto_increment {
            continue;
        }
        n += 1;
        params.push((format!("@p{n}"), value));
    }
    params
}

fn insert_statement<T: Entity>(
    mapping: &TableMapping,
    row: &T,
) -> (String, Vec<(String, Value)>) {
    (insert_sql(mapping), insert_params(mapping, row))
}

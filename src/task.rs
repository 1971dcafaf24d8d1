//! Asynchronous wrappers.
//!
//! Each wrapper schedules one blocking unit that acquires the execution
//! lock, runs to completion, and releases; no statement is ever split
//! across an await point. Cancellation is only observable before the unit
//! starts.

use crate::db::Database;
use crate::error::Error;
use crate::materialize::FromRow;
use crate::query::Query;
use crate::schema::Entity;
use crate::value::Value;

impl Database {
    /// Run `job` on the blocking pool with a clone of this handle.
    pub async fn run_async<R, F>(&self, job: F) -> Result<R, Error>
    where
        R: Send + 'static,
        F: FnOnce(Database) -> Result<R, Error> + Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || job(db))
            .await
            .map_err(|err| Error::Task(err.to_string()))?
    }

    pub async fn create_table_async<T: Entity>(&self) -> Result<(), Error> {
        self.run_async(|db| db.create_table::<T>()).await
    }

    /// Insert one row, returning it with any generated key written back.
    pub async fn insert_async<T: Entity>(&self, mut row: T) -> Result<T, Error> {
        self.run_async(move |db| {
            db.insert(&mut row)?;
            Ok(row)
        })
        .await
    }

    pub async fn insert_all_async<T: Entity>(&self, mut rows: Vec<T>) -> Result<Vec<T>, Error> {
        self.run_async(move |db| {
            db.insert_all(&mut rows)?;
            Ok(rows)
        })
        .await
    }

    pub async fn get_async<T: Entity>(&self, key: impl Into<Value>) -> Result<Option<T>, Error> {
        let key = key.into();
        self.run_async(move |db| db.get::<T>(key)).await
    }

    pub async fn delete_by_key_async<T: Entity>(
        &self,
        key: impl Into<Value>,
    ) -> Result<usize, Error> {
        let key = key.into();
        self.run_async(move |db| db.delete_by_key::<T>(key)).await
    }
}

impl<T: Entity, Out: FromRow + Send + 'static> Query<T, Out> {
    pub async fn to_vec_async(&self) -> Result<Vec<Out>, Error> {
        let query = self.clone();
        tokio::task::spawn_blocking(move || query.to_vec())
            .await
            .map_err(|err| Error::Task(err.to_string()))?
    }

    pub async fn first_async(&self) -> Result<Out, Error> {
        let query = self.clone();
        tokio::task::spawn_blocking(move || query.first())
            .await
            .map_err(|err| Error::Task(err.to_string()))?
    }

    pub async fn count_async(&self) -> Result<i64, Error> {
        let query = self.clone();
        tokio::task::spawn_blocking(move || query.count())
            .await
            .map_err(|err| Error::Task(err.to_string()))?
    }
}

// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database access shared by all services.
//!
//! Services talk to PostgreSQL in production and to an in-memory SQLite database in tests.  Both
//! are reached through the `Db` trait, which hands out pooled connections wrapped in an `Executor`
//! that queries destructure to pick the SQL dialect of each system.
//!
//! There is no transaction abstraction: every operation that services issue is a single statement
//! and the database serializes conflicting writes on its own.

use crate::model::ModelError;
use async_trait::async_trait;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Failures of database operations.  Failures that callers may want to react to get their own
/// variant and everything else becomes a `BackendError`.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DbError {
    /// The database reported an error that callers are not expected to handle.
    #[error("Database error: {0}")]
    BackendError(String),

    /// A row holds values that do not pass model validation.
    #[error("Data integrity error: {0}")]
    DataIntegrityError(String),

    /// The row targeted by the operation does not exist.
    #[error("Entity not found")]
    NotFound,

    /// No connection could be obtained, such as when the pool is exhausted.
    #[error("Unavailable")]
    Unavailable,
}

impl From<ModelError> for DbError {
    fn from(e: ModelError) -> Self {
        DbError::DataIntegrityError(e.0)
    }
}

/// Result type for this module.
pub type DbResult<T> = Result<T, DbError>;

/// A pooled connection to one of the supported database systems.
///
/// Queries must match on the variant to bind parameters and decode rows with the right types, so
/// every query function has one arm per enabled backend.  The connection goes back to the pool
/// when the executor is dropped.
#[derive(Debug)]
pub enum Executor {
    /// Connection to a PostgreSQL database.
    #[cfg(feature = "postgres")]
    Postgres(postgres::PostgresExecutor),

    /// Connection to a SQLite database.
    #[cfg(feature = "sqlite")]
    Sqlite(sqlite::SqliteExecutor),
}

/// Handle to a database connection pool.
#[async_trait]
pub trait Db {
    /// Takes a connection from the pool.
    ///
    /// Named `ex` instead of `executor` because nearly every query call site goes through it.
    async fn ex(&self) -> DbResult<Executor>;

    /// Closes all connections in the pool.  Must be called before dropping the database.
    async fn close(&self);
}

/// Macros to run the same tests against every database system.
#[cfg(any(test, feature = "testutils"))]
pub mod testutils {
    pub use paste::paste;

    /// Generates a test called `$name` that calls `$module::$name` with the database returned by
    /// the `$setup` expression.  `$extra` attaches an attribute, such as `#[ignore]`, to the test.
    #[macro_export]
    macro_rules! generate_one_test [
        ( $name:ident, $setup:expr, $module:path $(, #[$extra:meta] )? ) => {
            #[tokio::test]
            $(#[$extra])?
            async fn $name() {
                $crate::db::testutils::paste! {
                    $module :: [< $name >]($setup).await;
                }
            }
        }
    ];

    pub use generate_one_test;

    /// Generates one test per `$name` as `generate_one_test!` does, all of them sharing the same
    /// `$setup` expression and the optional `$extra` attribute.
    ///
    /// `$setup` is evaluated once per test, so each test gets its own database.
    #[macro_export]
    macro_rules! generate_tests [
        ( #[$extra:meta], $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module, #[$extra]);
            )+
        };

        ( $setup:expr, $module:path $(, $name:ident)+ ) => {
            $(
                $crate::db::testutils::generate_one_test!($name, $setup, $module);
            )+
        };
    ];

    pub use generate_tests;
}

#[cfg(all(test, any(feature = "postgres", feature = "sqlite")))]
mod tests {
    use super::*;
    use sqlx::Row;
    use std::sync::Arc;

    /// Executes `sql`, which must be portable across backends, and discards its results.
    async fn exec(ex: &mut Executor, sql: &str) {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                sqlx::query(sql).execute(&mut **ex).await.unwrap();
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                sqlx::query(sql).execute(&mut **ex).await.unwrap();
            }
        }
    }

    /// Runs `sql`, which must be portable across backends and return a single row, and returns
    /// the `i64` stored in its `column`.
    async fn fetch_i64(ex: &mut Executor, sql: &str, column: &str) -> i64 {
        match ex {
            #[cfg(feature = "postgres")]
            Executor::Postgres(ex) => {
                sqlx::query(sql).fetch_one(&mut **ex).await.unwrap().try_get(column).unwrap()
            }

            #[cfg(feature = "sqlite")]
            Executor::Sqlite(ex) => {
                sqlx::query(sql).fetch_one(&mut **ex).await.unwrap().try_get(column).unwrap()
            }
        }
    }

    pub(super) async fn test_direct_execution(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;
        exec(&mut db.ex().await.unwrap(), "INSERT INTO test (i) VALUES (3)").await;
        let count =
            fetch_i64(&mut db.ex().await.unwrap(), "SELECT COUNT(*) AS count FROM test", "count")
                .await;
        assert_eq!(1, count);

        db.close().await;
    }

    pub(super) async fn test_writes_visible_across_executors(db: Arc<dyn Db + Send + Sync>) {
        exec(&mut db.ex().await.unwrap(), "CREATE TABLE test (i INTEGER)").await;

        {
            let mut ex = db.ex().await.unwrap();
            exec(&mut ex, "INSERT INTO test (i) VALUES (3)").await;
            exec(&mut ex, "INSERT INTO test (i) VALUES (4)").await;
        }

        let mut ex = db.ex().await.unwrap();
        assert_eq!(7, fetch_i64(&mut ex, "SELECT SUM(i) AS total FROM test", "total").await);
        drop(ex);

        db.close().await;
    }

    pub(super) async fn test_concurrent_executors(db: Arc<dyn Db + Send + Sync>) {
        let mut ex1 = db.ex().await.unwrap();
        let mut ex2 = db.ex().await.unwrap();
        assert_eq!(1, fetch_i64(&mut ex1, "SELECT CAST(1 AS BIGINT) AS one", "one").await);
        assert_eq!(2, fetch_i64(&mut ex2, "SELECT CAST(2 AS BIGINT) AS two", "two").await);
        drop(ex1);
        drop(ex2);

        db.close().await;
    }

    /// Generates the tests that hold more than one connection at a time.  They do not write to
    /// the database, so they can run on a pool that is not confined to a single connection.
    macro_rules! generate_db_concurrent_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::tests,
                test_concurrent_executors
            );
        }
    ];

    pub(super) use generate_db_concurrent_tests;

    /// Generates the tests that create tables and write to them.
    macro_rules! generate_db_write_tests [
        ( $setup:expr $(, #[$extra:meta])? ) => {
            $crate::db::testutils::generate_tests!(
                $( #[$extra], )?
                $setup,
                $crate::db::tests,
                test_direct_execution,
                test_writes_visible_across_executors
            );
        }
    ];

    pub(super) use generate_db_write_tests;
}

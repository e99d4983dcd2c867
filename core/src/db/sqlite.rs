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

//! SQLite backend, used to run tests against an in-memory database.

use crate::db::{Db, DbError, DbResult, Executor};
use async_trait::async_trait;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqlitePool};

/// Converts the sqlx error `e` raised by a SQLite operation into a `DbError`.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::ColumnDecode { index, source } => {
            DbError::DataIntegrityError(format!("Cannot decode column {}: {}", index, source))
        }
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Opens a connection pool against the database described by `conn_str`.
///
/// Passing `:memory:` yields an in-memory database that is shared by all connections in the pool
/// and that vanishes once the pool is closed.
pub async fn connect(conn_str: &str) -> DbResult<SqliteDb> {
    let pool = SqlitePool::connect(conn_str).await.map_err(map_sqlx_error)?;
    Ok(SqliteDb { pool })
}

/// Pooled connection to a SQLite database.
pub type SqliteExecutor = PoolConnection<Sqlite>;

/// Connection pool to a SQLite database.
pub struct SqliteDb {
    /// The sqlx pool.  All of its connections see the same database, even if it is in memory.
    pool: SqlitePool,
}

impl SqliteDb {
    /// Takes a connection from the pool without wrapping it in an `Executor`.
    pub async fn typed_ex(&self) -> DbResult<SqliteExecutor> {
        self.pool.acquire().await.map_err(map_sqlx_error)
    }
}

impl Drop for SqliteDb {
    fn drop(&mut self) {
        if !self.pool.is_closed() {
            warn!("SqliteDb dropped without calling close()");
        }
    }
}

#[async_trait]
impl Db for SqliteDb {
    async fn ex(&self) -> DbResult<Executor> {
        Ok(Executor::Sqlite(self.typed_ex().await?))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Executes all statements in `schema`.
pub async fn run_schema(ex: &mut SqliteExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(&mut **ex).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Helpers to run tests against SQLite.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Creates a fresh in-memory database.  Panics on errors.
    pub async fn setup() -> SqliteDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();
        connect(":memory:").await.unwrap()
    }
}

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

//! PostgreSQL backend, used in production.

use crate::db::{Db, DbError, DbResult, Executor};
use crate::env::{get_optional_var, get_required_var};
use async_trait::async_trait;
use derivative::Derivative;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, Postgres};
use std::time::Duration;

/// Maximum time to wait for a free connection before declaring the database unavailable.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(2);

/// Converts the sqlx error `e` raised by a PostgreSQL operation into a `DbError`.
pub fn map_sqlx_error(e: sqlx::Error) -> DbError {
    match e {
        sqlx::Error::Database(e) => match e.code().as_deref() {
            Some("53300") /* too_many_connections */ => DbError::Unavailable,
            code => DbError::BackendError(format!("pgsql error {}: {}", code.unwrap_or("?"), e)),
        },
        sqlx::Error::ColumnDecode { index, source } => {
            DbError::DataIntegrityError(format!("Cannot decode column {}: {}", index, source))
        }
        sqlx::Error::PoolTimedOut => DbError::Unavailable,
        sqlx::Error::RowNotFound => DbError::NotFound,
        e => DbError::BackendError(e.to_string()),
    }
}

/// Connection settings for a PostgreSQL server.
#[derive(Derivative)]
#[derivative(Debug, Default)]
#[cfg_attr(test, derivative(PartialEq))]
pub struct PostgresOptions {
    /// Server hostname or address.
    pub host: String,

    /// Server port, usually 5432.
    pub port: u16,

    /// Name of the database to use.
    pub database: String,

    /// Role to log in as.
    pub username: String,

    /// Password of `username`.  Never printed.
    #[derivative(Debug = "ignore")]
    pub password: String,

    /// Connections that the pool keeps open even when idle.  Defaults to sqlx's choice.
    pub min_connections: Option<u32>,

    /// Upper bound on open connections.  Defaults to sqlx's choice.
    pub max_connections: Option<u32>,
}

impl PostgresOptions {
    /// Reads the options from the `<prefix>_HOST`, `<prefix>_PORT`, `<prefix>_DATABASE`,
    /// `<prefix>_USERNAME` and `<prefix>_PASSWORD` variables, all of which must be set, and from
    /// the optional `<prefix>_MIN_CONNECTIONS` and `<prefix>_MAX_CONNECTIONS`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            host: get_required_var(prefix, "HOST")?,
            port: get_required_var(prefix, "PORT")?,
            database: get_required_var(prefix, "DATABASE")?,
            username: get_required_var(prefix, "USERNAME")?,
            password: get_required_var(prefix, "PASSWORD")?,
            min_connections: get_optional_var(prefix, "MIN_CONNECTIONS")?,
            max_connections: get_optional_var(prefix, "MAX_CONNECTIONS")?,
        })
    }
}

/// Pooled connection to a PostgreSQL database.
pub type PostgresExecutor = PoolConnection<Postgres>;

/// Connection pool to a PostgreSQL database, shared by all concurrent requests.
pub struct PostgresDb {
    /// The sqlx pool.  Clones of it refer to the same set of connections.
    pool: PgPool,
}

impl PostgresDb {
    /// Creates a pool configured by `opts`.
    ///
    /// Connections are opened lazily, so this succeeds even if the server is unreachable.  Errors
    /// surface on the first `ex` call instead, after waiting up to `ACQUIRE_TIMEOUT`.
    pub fn connect(opts: PostgresOptions) -> Self {
        let mut pool_options = PgPoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);
        if let Some(n) = opts.min_connections {
            pool_options = pool_options.min_connections(n);
        }
        if let Some(n) = opts.max_connections {
            pool_options = pool_options.max_connections(n);
        }

        let connect_options = PgConnectOptions::new()
            .host(&opts.host)
            .port(opts.port)
            .database(&opts.database)
            .username(&opts.username)
            .password(&opts.password);

        Self { pool: pool_options.connect_lazy_with(connect_options) }
    }

    /// Takes a connection from the pool without wrapping it in an `Executor`.
    pub async fn typed_ex(&self) -> DbResult<PostgresExecutor> {
        self.pool.acquire().await.map_err(map_sqlx_error)
    }
}

impl Drop for PostgresDb {
    fn drop(&mut self) {
        if self.pool.is_closed() {
            return;
        }
        if cfg!(debug_assertions) {
            panic!("PostgresDb dropped without calling close()");
        }
        warn!("PostgresDb dropped without calling close()");
    }
}

#[async_trait]
impl Db for PostgresDb {
    async fn ex(&self) -> DbResult<Executor> {
        Ok(Executor::Postgres(self.typed_ex().await?))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Executes all statements in `schema`.
pub async fn run_schema(ex: &mut PostgresExecutor, schema: &str) -> DbResult<()> {
    sqlx::raw_sql(schema).execute(&mut **ex).await.map_err(map_sqlx_error)?;
    Ok(())
}

/// Helpers to run tests against a real PostgreSQL server.
#[cfg(any(feature = "testutils", test))]
pub mod testutils {
    use super::*;

    /// Connects to the server configured by the `PGSQL_TEST_*` variables.
    ///
    /// The pool is limited to a single connection whose `search_path` points to `pg_temp`, so
    /// every table created by the test is private to it and vanishes on `close`.  Panics on
    /// errors.
    pub async fn setup() -> PostgresDb {
        let _can_fail = env_logger::builder().is_test(true).try_init();

        let mut opts = PostgresOptions::from_env("PGSQL_TEST").unwrap();
        opts.min_connections = Some(1);
        opts.max_connections = Some(1);
        let db = PostgresDb::connect(opts);

        let mut ex = db.typed_ex().await.unwrap();
        sqlx::query("SET search_path TO pg_temp").execute(&mut *ex).await.unwrap();
        db
    }
}

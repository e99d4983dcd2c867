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

//! Database abstraction in terms of the operations needed by the server.
//!
//! Every function in this module issues exactly one statement on the given executor.

use crate::model::{Author, AuthorFields, AuthorId, AuthorPatch};
use authors_core::db::postgres;
#[cfg(test)]
use authors_core::db::sqlite;
use authors_core::db::{DbError, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::postgres::PgRow;
#[cfg(test)]
use sqlx::sqlite::SqliteRow;
use sqlx::Row;


/// Initializes the database schema.  Safe to call on an already-initialized database.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Postgres(ex) => postgres::run_schema(ex, include_str!("postgres.sql")).await,

        #[cfg(test)]
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Converts a PostgreSQL `row` with the `id`, `name` and `bio` columns into an `Author`.
fn pg_row_to_author(row: PgRow) -> DbResult<Author> {
    let id: i64 = row.try_get("id").map_err(postgres::map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(postgres::map_sqlx_error)?;
    let bio: String = row.try_get("bio").map_err(postgres::map_sqlx_error)?;
    Ok(Author::from_raw(id, name, bio)?)
}

/// Converts a SQLite `row` with the `id`, `name` and `bio` columns into an `Author`.
#[cfg(test)]
fn sqlite_row_to_author(row: SqliteRow) -> DbResult<Author> {
    let id: i64 = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
    let name: String = row.try_get("name").map_err(sqlite::map_sqlx_error)?;
    let bio: String = row.try_get("bio").map_err(sqlite::map_sqlx_error)?;
    Ok(Author::from_raw(id, name, bio)?)
}

/// Stores a new author described by `fields` and returns it with its newly-assigned identifier.
pub(crate) async fn create_author(ex: &mut Executor, fields: &AuthorFields) -> DbResult<Author> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                INSERT INTO author (name, bio) VALUES ($1, $2)
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(fields.name().as_ref())
                .bind(fields.bio().as_ref())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            pg_row_to_author(row)
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO author (name, bio) VALUES (?, ?)
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(fields.name().as_ref())
                .bind(fields.bio().as_ref())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            sqlite_row_to_author(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets the author identified by `id`.  Returns `DbError::NotFound` if it does not exist.
pub(crate) async fn get_author(ex: &mut Executor, id: AuthorId) -> DbResult<Author> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "SELECT id, name, bio FROM author WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            pg_row_to_author(row)
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "SELECT id, name, bio FROM author WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            sqlite_row_to_author(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites all fields of the author identified by `id` with `fields` and returns the updated
/// author.  Returns `DbError::NotFound` if it does not exist.
pub(crate) async fn replace_author(
    ex: &mut Executor,
    id: AuthorId,
    fields: &AuthorFields,
) -> DbResult<Author> {
    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE author SET name = $1, bio = $2
                WHERE id = $3
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(fields.name().as_ref())
                .bind(fields.bio().as_ref())
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            pg_row_to_author(row)
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE author SET name = ?, bio = ?
                WHERE id = ?
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(fields.name().as_ref())
                .bind(fields.bio().as_ref())
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            sqlite_row_to_author(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Overwrites the fields of the author identified by `id` that are present in `patch` and returns
/// the updated author.  Returns `DbError::NotFound` if it does not exist.
///
/// The query receives an explicit overwrite flag next to each value so that an omitted field is
/// never confused with a supplied one.
pub(crate) async fn update_author(
    ex: &mut Executor,
    id: AuthorId,
    patch: &AuthorPatch,
) -> DbResult<Author> {
    let update_name = patch.name().is_some();
    let name: Option<&String> = patch.name().as_ref().map(|name| name.as_ref());
    let update_bio = patch.bio().is_some();
    let bio: Option<&String> = patch.bio().as_ref().map(|bio| bio.as_ref());

    match ex {
        Executor::Postgres(ex) => {
            let query_str = "
                UPDATE author SET
                    name = CASE WHEN $1 THEN $2 ELSE name END,
                    bio = CASE WHEN $3 THEN $4 ELSE bio END
                WHERE id = $5
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(update_name)
                .bind(name)
                .bind(update_bio)
                .bind(bio)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?;
            pg_row_to_author(row)
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "
                UPDATE author SET
                    name = CASE WHEN ?1 THEN ?2 ELSE name END,
                    bio = CASE WHEN ?3 THEN ?4 ELSE bio END
                WHERE id = ?5
                RETURNING id, name, bio
            ";
            let row = sqlx::query(query_str)
                .bind(update_name)
                .bind(name)
                .bind(update_bio)
                .bind(bio)
                .bind(id.as_i64())
                .fetch_one(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?;
            sqlite_row_to_author(row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Deletes the author identified by `id`.  Returns `DbError::NotFound` if it does not exist.
pub(crate) async fn delete_author(ex: &mut Executor, id: AuthorId) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ex) => {
            let query_str = "DELETE FROM author WHERE id = $1";
            sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let query_str = "DELETE FROM author WHERE id = ?";
            sqlx::query(query_str)
                .bind(id.as_i64())
                .execute(&mut **ex)
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }

        #[allow(unused)]
        _ => unreachable!(),
    };

    match rows_affected {
        0 => Err(DbError::NotFound),
        1 => Ok(()),
        _ => Err(DbError::BackendError(format!(
            "Deletion of author {} affected {} rows",
            id, rows_affected
        ))),
    }
}

/// Gets all existing authors sorted by their identifier, which matches creation order.
pub(crate) async fn list_authors(ex: &mut Executor) -> DbResult<Vec<Author>> {
    let query_str = "SELECT id, name, bio FROM author ORDER BY id";

    let mut authors = vec![];
    match ex {
        Executor::Postgres(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                authors.push(pg_row_to_author(row)?);
            }
        }

        #[cfg(test)]
        Executor::Sqlite(ex) => {
            let mut rows = sqlx::query(query_str).fetch(&mut **ex);
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                authors.push(sqlite_row_to_author(row)?);
            }
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
    Ok(authors)
}

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

//! Operations on one author.

use crate::db;
use crate::driver::{backend_error, Driver};
use crate::model::*;
use authors_core::db::DbError;
use authors_core::driver::{DriverError, DriverResult};
use log::debug;

/// Builds the error returned when the author `id` does not exist.
fn not_found(id: AuthorId) -> DriverError {
    DriverError::NotFound(format!("Author {} not found", id))
}

impl Driver {
    /// Deletes the author identified by `id`.  Deleting an author that does not exist is not an
    /// error.
    pub(crate) async fn delete_author(self, id: AuthorId) -> DriverResult<()> {
        let context = format!("Error deleting author {}", id);
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, &context))?;
        match db::delete_author(&mut ex, id).await {
            Ok(()) => Ok(()),
            Err(DbError::NotFound) => {
                debug!("Author {} did not exist; nothing to delete", id);
                Ok(())
            }
            Err(e) => Err(backend_error(e, &context)),
        }
    }

    /// Gets the author identified by `id`, or `None` if it does not exist.
    pub(crate) async fn get_author(self, id: AuthorId) -> DriverResult<Option<Author>> {
        let context = format!("Error getting author {}", id);
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, &context))?;
        match db::get_author(&mut ex, id).await {
            Ok(author) => Ok(Some(author)),
            Err(DbError::NotFound) => Ok(None),
            Err(e) => Err(backend_error(e, &context)),
        }
    }

    /// Overwrites all fields of the author identified by `id` with `fields`.
    pub(crate) async fn replace_author(
        self,
        id: AuthorId,
        fields: AuthorFields,
    ) -> DriverResult<Author> {
        let context = format!("Error replacing author {}", id);
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, &context))?;
        match db::replace_author(&mut ex, id, &fields).await {
            Ok(author) => Ok(author),
            Err(DbError::NotFound) => Err(not_found(id)),
            Err(e) => Err(backend_error(e, &context)),
        }
    }

    /// Overwrites the fields of the author identified by `id` that are present in `patch`.
    pub(crate) async fn update_author(
        self,
        id: AuthorId,
        patch: AuthorPatch,
    ) -> DriverResult<Author> {
        let context = format!("Error updating author {}", id);
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, &context))?;
        match db::update_author(&mut ex, id, &patch).await {
            Ok(author) => Ok(author),
            Err(DbError::NotFound) => Err(not_found(id)),
            Err(e) => Err(backend_error(e, &context)),
        }
    }
}

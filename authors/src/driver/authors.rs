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

//! Operations on the collection of authors.

use crate::db;
use crate::driver::{backend_error, Driver};
use crate::model::*;
use authors_core::driver::DriverResult;

impl Driver {
    /// Creates a new author from `fields` and returns it with its assigned identifier.
    pub(crate) async fn create_author(self, fields: AuthorFields) -> DriverResult<Author> {
        let context = "Error creating author";
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, context))?;
        db::create_author(&mut ex, &fields).await.map_err(|e| backend_error(e, context))
    }

    /// Gets all existing authors in creation order.
    pub(crate) async fn list_authors(self) -> DriverResult<Vec<Author>> {
        let context = "Error listing authors";
        let mut ex = self.db.ex().await.map_err(|e| backend_error(e, context))?;
        db::list_authors(&mut ex).await.map_err(|e| backend_error(e, context))
    }
}

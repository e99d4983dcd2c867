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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use crate::rest::app;
use authors_core::db::{Db, DbError, Executor};
use axum::Router;
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(authors_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone());
        let app = app(driver);
        Self { db, app }
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    pub(crate) async fn create_author<N: Into<String>, B: Into<String>>(
        &self,
        name: N,
        bio: B,
    ) -> Author {
        let fields =
            AuthorFields::new(AuthorName::new(name).unwrap(), AuthorBio::new(bio).unwrap());
        db::create_author(&mut self.db.ex().await.unwrap(), &fields).await.unwrap()
    }

    pub(crate) async fn get_author(&self, id: AuthorId) -> Option<Author> {
        match db::get_author(&mut self.db.ex().await.unwrap(), id).await {
            Ok(author) => Some(author),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{}", e),
        }
    }

    pub(crate) async fn list_authors(&self) -> Vec<Author> {
        db::list_authors(&mut self.db.ex().await.unwrap()).await.unwrap()
    }

    /// Removes the schema from the database so that any further operation fails.
    pub(crate) async fn break_schema(&self) {
        match self.db.ex().await.unwrap() {
            Executor::Sqlite(mut ex) => {
                sqlx::query("DROP TABLE author").execute(&mut *ex).await.unwrap();
            }
            #[allow(unused)]
            _ => unreachable!(),
        }
    }
}

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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::Driver;
use crate::model::*;
use authors_core::db::{Db, Executor};
use std::sync::Arc;

pub(crate) struct TestContext {
    db: Arc<dyn Db + Send + Sync>,
    driver: Driver,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        let db = Arc::new(authors_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let driver = Driver::new(db.clone());
        Self { db, driver }
    }

    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Creates an author directly in the database, bypassing the driver.
    pub(crate) async fn create_author(&self, name: &'static str, bio: &'static str) -> Author {
        let fields =
            AuthorFields::new(AuthorName::new(name).unwrap(), AuthorBio::new(bio).unwrap());
        db::create_author(&mut self.ex().await, &fields).await.unwrap()
    }

    /// Removes the schema from the database so that any further operation fails.
    pub(crate) async fn break_schema(&self) {
        match self.ex().await {
            Executor::Sqlite(mut ex) => {
                sqlx::query("DROP TABLE author").execute(&mut *ex).await.unwrap();
            }
            #[allow(unused)]
            _ => unreachable!(),
        }
    }
}

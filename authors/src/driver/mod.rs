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

//! Business logic for the service.

use authors_core::db::{Db, DbError};
use authors_core::driver::DriverError;
use log::warn;
use std::sync::Arc;

mod author;
mod authors;
#[cfg(test)]
mod testutils;

/// Converts a database error `e` that is not expected by an operation into a driver error,
/// prefixing it with the `context` of the operation and logging it.
fn backend_error(e: DbError, context: &str) -> DriverError {
    let e = DriverError::from(e).with_context(context);
    warn!("{}", e);
    e
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": each of them issues a single
/// database statement on a connection taken from the pool.  These operations consume the driver
/// to make it clear that every request handler gets its own copy.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>) -> Self {
        Self { db }
    }
}

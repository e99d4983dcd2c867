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

//! Business logic shared by all services.
//!
//! Services define a `Driver` type that owns their injected dependencies, which usually boils down
//! to a shared handle to the database:
//!
//! ```rust
//! use authors_core::db::Db;
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! pub(crate) struct Driver {
//!     /// Persistence layer.
//!     db: Arc<dyn Db + Send + Sync>,
//! }
//! ```
//!
//! Driver operations take `self` by value: REST handlers get a clone of the driver, run a single
//! operation on it and let it go.

use crate::db::DbError;

/// Failures of business operations.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum DriverError {
    /// The operation failed for reasons that the caller cannot fix, such as a database outage.
    #[error("{0}")]
    BackendError(String),

    /// The entity that the operation targets does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl DriverError {
    /// Prepends `context` to the message of a backend error so that the operation that failed
    /// can be identified once the error reaches the logs or the client.
    ///
    /// Other error types are returned unmodified.
    pub fn with_context(self, context: &str) -> Self {
        match self {
            DriverError::BackendError(message) => {
                DriverError::BackendError(format!("{}: {}", context, message))
            }
            e => e,
        }
    }
}

impl From<DbError> for DriverError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => DriverError::NotFound(e.to_string()),
            e => DriverError::BackendError(e.to_string()),
        }
    }
}

/// Result type for this module.
pub type DriverResult<T> = Result<T, DriverError>;

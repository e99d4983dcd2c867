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

//! Shared building blocks for the authors service.
//!
//! A service built on this crate is split in layers, each one living in a module of the same name
//! and only talking to the layer right below it:
//!
//! 1.  `model`: Validated domain types, typically newtypes whose constructors reject bad values.
//!     Deserialization goes through the same constructors, so a value that fails validation never
//!     leaves the HTTP layer.
//!
//! 1.  `db`: Free functions that take an `Executor`, issue a single statement and convert rows
//!     back into model types.  Each function has one arm per supported database system.
//!
//! 1.  `driver`: A `Driver` type that holds the database handle, runs one operation per call and
//!     decides which storage failures are expected (such as absent rows) and which are not.
//!
//! 1.  `rest`: An `axum::Router` with one handler per API.  Handlers extract and validate their
//!     inputs, call the driver and render the results.
//!
//! 1.  `main`: Reads the configuration, opens the database and hands both to `serve`.
//!
//! Every layer has its own error type (`ModelError`, `DbError`, `DriverError` and `RestError`) with
//! `From` conversions between neighbors, so `?` carries failures upwards until the REST layer turns
//! them into HTTP status codes.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;

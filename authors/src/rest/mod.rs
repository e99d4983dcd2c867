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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;

mod author_delete;
mod author_get;
mod author_patch;
mod author_put;
mod authors_get;
mod authors_post;
#[cfg(test)]
mod testutils;

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::get;
    Router::new()
        .route(
            "/authors/:id",
            get(author_get::handler)
                .put(author_put::handler)
                .patch(author_patch::handler)
                .delete(author_delete::handler),
        )
        .route("/authors", get(authors_get::handler).post(authors_post::handler))
        .with_state(driver)
}

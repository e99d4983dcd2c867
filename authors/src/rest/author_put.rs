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

//! API to replace all fields of one author.

use crate::driver::Driver;
use crate::model::{AuthorFields, AuthorId};
use authors_core::rest::{JsonBody, PathParam, RestError};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<AuthorId>,
    JsonBody(fields): JsonBody<AuthorFields>,
) -> Result<impl IntoResponse, RestError> {
    let author = driver.replace_author(id, fields).await?;

    Ok(Json(author))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use authors_core::rest::testutils::*;
    use axum::http;
    use serde_json::json;

    fn route(id: impl ToString) -> (http::Method, String) {
        (http::Method::PUT, format!("/authors/{}", id.to_string()))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let author = context.create_author("A", "B").await;
        let other = context.create_author("C", "D").await;

        let response = OneShotBuilder::new(context.app(), route(author.id()))
            .send_json(json!({"name": "X", "bio": "Y"}))
            .await
            .expect_json::<Author>()
            .await;
        assert_eq!(author.id(), response.id());
        assert_eq!("X", response.name().as_ref());
        assert_eq!("Y", response.bio().as_ref());

        assert_eq!(Some(response), context.get_author(*author.id()).await);
        assert_eq!(Some(other.clone()), context.get_author(*other.id()).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let author = context.create_author("A", "B").await;

        OneShotBuilder::new(context.app(), route(1234))
            .send_json(json!({"name": "X", "bio": "Y"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error("Author 1234 not found")
            .await;

        assert_eq!(vec![author], context.list_authors().await);
    }

    #[tokio::test]
    async fn test_missing_field() {
        let context = TestContext::setup().await;

        let author = context.create_author("A", "B").await;

        OneShotBuilder::new(context.app(), route(author.id()))
            .send_json(json!({"name": "X"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("missing field `bio`")
            .await;

        assert_eq!(Some(author.clone()), context.get_author(*author.id()).await);
    }

    #[tokio::test]
    async fn test_bad_id() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route(0))
            .send_json(json!({"name": "X", "bio": "Y"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("Invalid URL")
            .await;
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup().await;

        context.break_schema().await;

        OneShotBuilder::new(context.app(), route(1))
            .send_json(json!({"name": "X", "bio": "Y"}))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Error replacing author 1: ")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route(1));
}

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

//! API to create a new author.

use crate::driver::Driver;
use crate::model::AuthorFields;
use authors_core::rest::{JsonBody, RestError};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{http, Json};

/// API handler.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(fields): JsonBody<AuthorFields>,
) -> Result<impl IntoResponse, RestError> {
    let author = driver.create_author(fields).await?;

    Ok((http::StatusCode::CREATED, Json(author)))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use authors_core::rest::testutils::*;
    use axum::http;
    use serde_json::json;

    fn route() -> (http::Method, String) {
        (http::Method::POST, "/authors".to_owned())
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let response = OneShotBuilder::new(context.app(), route())
            .send_json(json!({"name": "A", "bio": "B"}))
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Author>()
            .await;
        assert_eq!("A", response.name().as_ref());
        assert_eq!("B", response.bio().as_ref());

        assert_eq!(Some(response.clone()), context.get_author(*response.id()).await);
    }

    #[tokio::test]
    async fn test_round_trip() {
        let context = TestContext::setup().await;

        let fields = AuthorFields::new(
            AuthorName::new("Ursula K. Le Guin").unwrap(),
            AuthorBio::new("Wrote about Earthsea").unwrap(),
        );
        let created = OneShotBuilder::new(context.app(), route())
            .send_json(&fields)
            .await
            .expect_status(http::StatusCode::CREATED)
            .expect_json::<Author>()
            .await;

        let fetched = OneShotBuilder::new(
            context.app(),
            (http::Method::GET, format!("/authors/{}", created.id())),
        )
        .send_empty()
        .await
        .expect_json::<Author>()
        .await;
        assert_eq!(created, fetched);
        assert_eq!(fields, fetched.fields());
    }

    #[tokio::test]
    async fn test_missing_bio() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({"name": "A"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("missing field `bio`")
            .await;

        assert!(context.list_authors().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_name() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({"name": "", "bio": "B"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("name cannot be empty")
            .await;

        assert!(context.list_authors().await.is_empty());
    }

    #[tokio::test]
    async fn test_name_too_long() {
        let context = TestContext::setup().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({"name": "x".repeat(33), "bio": "B"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("longer than 32 characters")
            .await;

        assert!(context.list_authors().await.is_empty());
    }

    #[tokio::test]
    async fn test_backend_error() {
        let context = TestContext::setup().await;

        context.break_schema().await;

        OneShotBuilder::new(context.app(), route())
            .send_json(json!({"name": "A", "bio": "B"}))
            .await
            .expect_status(http::StatusCode::INTERNAL_SERVER_ERROR)
            .expect_error("^Error creating author: ")
            .await;
    }

    test_payload_must_be_json!(TestContext::setup().await.into_app(), route());
}

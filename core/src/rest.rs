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

//! HTTP layer shared by all APIs.
//!
//! Services expose an `app` function that builds the `axum::Router` and keep each API in its own
//! file named `<entity>_<method>.rs`, which holds the handler and the tests that exercise it over
//! HTTP.  The tests of an API start with a `route` function that returns the method and path of
//! the API so that every test in the file hits the same endpoint.
//!
//! Handlers take their inputs through `PathParam`, `JsonBody` and `EmptyBody`.  These wrap the
//! stock `axum` extractors and report malformed requests as `RestError`s so that all failures
//! share the same JSON shape.

use crate::driver::DriverError;
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Failures reported to clients, each one mapping to a single HTTP status code.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RestError {
    /// The server failed to process a valid request.
    #[error("{0}")]
    InternalError(String),

    /// The request was malformed or carried values that do not pass validation.
    #[error("{0}")]
    InvalidRequest(String),

    /// The request referred to an entity that does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request carried a body on an API that takes none.
    #[error("Content should be empty")]
    PayloadNotEmpty,
}

impl RestError {
    /// Returns the HTTP status code that represents this error.
    fn status(&self) -> StatusCode {
        match self {
            RestError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => StatusCode::NOT_FOUND,
            RestError::PayloadNotEmpty => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

impl From<DriverError> for RestError {
    fn from(e: DriverError) -> Self {
        match e {
            DriverError::BackendError(message) => RestError::InternalError(message),
            DriverError::NotFound(message) => RestError::NotFound(message),
        }
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Body of every failed response.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct ErrorResponse {
    /// Human-readable description of the failure.
    pub(crate) error: String,
}

/// Extractor for APIs that take no request body.
///
/// Rejects any request that carries content so that clients cannot rely on data that the server
/// silently ignores.
pub struct EmptyBody;

#[async_trait]
impl<S> FromRequest<S> for EmptyBody
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if !req.into_body().is_end_stream() {
            return Err(RestError::PayloadNotEmpty);
        }
        Ok(EmptyBody)
    }
}

/// Extractor for JSON request bodies.
///
/// Unlike `axum::Json`, which answers with plain text and a variety of status codes, any problem
/// with the payload (wrong content type, syntax errors, missing fields or values rejected by the
/// model types) becomes an `InvalidRequest`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| RestError::InvalidRequest(e.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// Extractor for path parameters that reports parsing failures as `InvalidRequest`s.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| RestError::InvalidRequest(e.body_text()))?;
        Ok(PathParam(value))
    }
}

/// Helpers to test APIs in-process, without going through the network.
#[cfg(feature = "testutils")]
pub mod testutils {
    use super::*;
    use axum::body::Body;
    use axum::http::{self, header, HeaderName, HeaderValue};
    use axum::Router;
    use tower::util::ServiceExt;

    /// Largest response body that tests are willing to read.
    const MAX_BODY_SIZE: usize = 64 * 1024;

    /// Request to send to an app exactly once.
    #[must_use]
    pub struct OneShotBuilder {
        /// App that will process the request.
        app: Router,

        /// Request under construction.
        builder: http::request::Builder,
    }

    impl OneShotBuilder {
        /// Prepares a request for `app` that targets the `(method, uri)` route.
        pub fn new<U: AsRef<str>>(app: Router, route: (http::Method, U)) -> Self {
            let (method, uri) = route;
            let builder = Request::builder().method(method).uri(uri.as_ref());
            Self { app, builder }
        }

        /// Adds the `name` header with `value` to the request.
        pub fn with_header<K, V>(self, name: K, value: V) -> Self
        where
            HeaderName: TryFrom<K>,
            <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
            HeaderValue: TryFrom<V>,
            <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
        {
            Self { app: self.app, builder: self.builder.header(name, value) }
        }

        /// Sends the request with `body`, tagging it with `content_type` if given.
        async fn send(self, content_type: Option<&str>, body: Body) -> ResponseChecker {
            let mut builder = self.builder;
            if let Some(content_type) = content_type {
                builder = builder.header(header::CONTENT_TYPE, content_type);
            }
            let request = builder.body(body).unwrap();
            let response = self.app.oneshot(request).await.unwrap();
            ResponseChecker { response, exp_status: StatusCode::OK }
        }

        /// Sends the request without a body.
        pub async fn send_empty(self) -> ResponseChecker {
            self.send(None, Body::empty()).await
        }

        /// Sends the request with `text` as a plain text body.
        pub async fn send_text<T: Into<String>>(self, text: T) -> ResponseChecker {
            self.send(Some(mime::TEXT_PLAIN.as_ref()), Body::from(text.into())).await
        }

        /// Sends the request with the JSON serialization of `value` as the body.
        pub async fn send_json<T: Serialize>(self, value: T) -> ResponseChecker {
            let json = serde_json::to_vec(&value).unwrap();
            self.send(Some(mime::APPLICATION_JSON.as_ref()), Body::from(json)).await
        }
    }

    /// Assertions on the response returned by an app for a `OneShotBuilder` request.
    ///
    /// The status code is expected to be `200 OK` unless `expect_status` says otherwise, and it is
    /// checked by every method that consumes the response.
    #[must_use]
    pub struct ResponseChecker {
        /// Response returned by the app.
        response: Response,

        /// Status code that `response` must carry.
        exp_status: StatusCode,
    }

    impl ResponseChecker {
        /// Overrides the status code that the response must carry.
        pub fn expect_status(self, exp_status: StatusCode) -> Self {
            Self { response: self.response, exp_status }
        }

        /// Checks the status code and returns the raw response body.
        async fn into_body(self) -> Vec<u8> {
            assert_eq!(self.exp_status, self.response.status());
            let bytes = axum::body::to_bytes(self.response.into_body(), MAX_BODY_SIZE).await;
            bytes.unwrap().to_vec()
        }

        /// Checks that the response has no body.
        pub async fn expect_empty(self) {
            let body = self.into_body().await;
            assert!(
                body.is_empty(),
                "Expected empty body but got {}",
                String::from_utf8_lossy(&body)
            );
        }

        /// Checks that the response is an `ErrorResponse` whose message matches the `exp_re`
        /// regular expression.
        pub async fn expect_error(self, exp_re: &str) {
            let body = self.into_body().await;
            let response = serde_json::from_slice::<ErrorResponse>(&body).unwrap_or_else(|e| {
                panic!("Bad error response ({}): {}", e, String::from_utf8_lossy(&body))
            });
            let re = regex::Regex::new(exp_re).unwrap();
            assert!(
                re.is_match(&response.error),
                "'{}' does not match '{}'",
                response.error,
                exp_re
            );
        }

        /// Checks that the response body is the JSON representation of a `T` and returns it.
        pub async fn expect_json<T: DeserializeOwned>(self) -> T {
            let body = self.into_body().await;
            serde_json::from_slice::<T>(&body).unwrap_or_else(|e| {
                panic!("Bad JSON response ({}): {}", e, String::from_utf8_lossy(&body))
            })
        }

        /// Checks the status code and returns the response body as text.
        pub async fn take_body_as_text(self) -> String {
            String::from_utf8(self.into_body().await).unwrap()
        }
    }

    /// Generates `test_payload_must_be_json`, which checks that the API at `$route` rejects
    /// bodies that are not JSON, whether or not they claim to be.
    #[macro_export]
    macro_rules! test_payload_must_be_json {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_json() {
                use $crate::rest::testutils::OneShotBuilder;

                OneShotBuilder::new($app, $route)
                    .send_text("plain text")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("Content-Type")
                    .await;

                OneShotBuilder::new($app, $route)
                    .with_header(axum::http::header::CONTENT_TYPE, "application/json")
                    .send_text("plain text")
                    .await
                    .expect_status(axum::http::StatusCode::BAD_REQUEST)
                    .expect_error("expected value")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_json;

    /// Generates `test_payload_must_be_empty`, which checks that the API at `$route` rejects
    /// requests that carry a body.
    #[macro_export]
    macro_rules! test_payload_must_be_empty {
        ( $app:expr, $route:expr ) => {
            #[tokio::test]
            async fn test_payload_must_be_empty() {
                $crate::rest::testutils::OneShotBuilder::new($app, $route)
                    .send_text("unexpected")
                    .await
                    .expect_status(axum::http::StatusCode::PAYLOAD_TOO_LARGE)
                    .expect_error("should be empty")
                    .await;
            }
        };
    }

    pub use test_payload_must_be_empty;
}

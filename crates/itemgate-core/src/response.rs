//! The response shape returned by handlers and the router.
//!
//! Every response carries `Content-Type: application/json` and a permissive
//! `Access-Control-Allow-Origin` header. Building a JSON body never fails:
//! if serialization does, the response degrades to a fixed 500 body.

use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

use crate::error::{ApiError, ErrorBody};

/// Body used when a response cannot be serialized.
pub const SERIALIZATION_FAILURE_BODY: &str =
    r#"{"code":"INTERNAL_SERVER_ERROR","message":"Error serializing response"}"#;

/// Content type of every response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An outgoing API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
}

impl ApiResponse {
    /// Creates a response with a JSON body.
    ///
    /// Falls back to [`SERIALIZATION_FAILURE_BODY`] with status 500 when
    /// `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(json) => Self::raw(status, Some(json)),
            Err(e) => {
                tracing::error!(error = %e, "error serializing response body");
                Self::serialization_failure()
            }
        }
    }

    /// Creates a 200 response with a JSON body.
    pub fn ok<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(StatusCode::OK, body)
    }

    /// Creates a 201 response with a JSON body.
    pub fn created<T: Serialize + ?Sized>(body: &T) -> Self {
        Self::json(StatusCode::CREATED, body)
    }

    /// Creates a 204 response with no body.
    #[must_use]
    pub fn no_content() -> Self {
        Self::raw(StatusCode::NO_CONTENT, None)
    }

    /// Creates an error response with the standard error body.
    #[must_use]
    pub fn error(error: &ApiError) -> Self {
        Self::json(error.status_code(), &error.to_body())
    }

    /// Creates an error response from an explicit body.
    #[must_use]
    pub fn error_body(status: StatusCode, body: &ErrorBody) -> Self {
        Self::json(status, body)
    }

    /// The fixed response used when serialization fails.
    #[must_use]
    pub fn serialization_failure() -> Self {
        Self::raw(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(SERIALIZATION_FAILURE_BODY.to_string()),
        )
    }

    fn raw(status: StatusCode, body: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Decomposes the response.
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Option<String>) {
        (self.status, self.headers, self.body)
    }
}

impl From<ApiError> for ApiResponse {
    fn from(error: ApiError) -> Self {
        Self::error(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_json_response_headers() {
        let response = ApiResponse::ok(&serde_json::json!({"message": "hi"}));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(
            response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert_eq!(response.body(), Some(r#"{"message":"hi"}"#));
    }

    #[test]
    fn test_no_content_has_json_content_type_and_no_body() {
        let response = ApiResponse::no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_none());
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_error_response() {
        let response = ApiResponse::from(ApiError::validation("Name is required"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.body(),
            Some(r#"{"code":"BAD_REQUEST","message":"Name is required"}"#)
        );
    }

    #[test]
    fn test_serialization_failure_falls_back() {
        // Non-string map keys cannot be represented in JSON.
        let mut unserializable = HashMap::new();
        unserializable.insert((1, 2), "value");

        let response = ApiResponse::ok(&unserializable);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), Some(SERIALIZATION_FAILURE_BODY));
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }
}

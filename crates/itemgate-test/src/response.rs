//! Response wrapper with assertion helpers.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use itemgate_core::{ApiResponse, ErrorBody, ErrorCode};
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A dispatched response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
}

impl From<ApiResponse> for TestResponse {
    fn from(response: ApiResponse) -> Self {
        let (status, headers, body) = response.into_parts();
        Self {
            status,
            headers,
            body,
        }
    }
}

impl TestResponse {
    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(CONTENT_TYPE.as_str())
    }

    /// Returns the body, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        let body = self.body.as_deref().ok_or(TestError::EmptyBody)?;
        Ok(serde_json::from_str(body)?)
    }

    /// Deserializes the body as a JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Deserializes the body as an error body.
    pub fn error_body(&self) -> Result<ErrorBody, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {} with body {:?}",
            expected,
            self.status,
            self.body
        );
        self
    }

    /// Asserts the status and the error code of an error response.
    ///
    /// # Panics
    ///
    /// Panics if the status differs or the body is not an error body with
    /// the expected code.
    pub fn assert_error(&self, expected: ErrorCode) -> &Self {
        self.assert_status(expected.status_code());
        let body = self
            .error_body()
            .unwrap_or_else(|e| panic!("Expected error body, got {:?}: {e}", self.body));
        assert_eq!(body.code, expected, "Unexpected error code");
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(
            self.header_str(name),
            Some(expected),
            "Unexpected value for header {name}"
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itemgate_core::ApiError;

    #[test]
    fn test_from_api_response() {
        let response = TestResponse::from(ApiResponse::ok(&serde_json::json!({"a": 1})));
        response
            .assert_status(StatusCode::OK)
            .assert_header("content-type", "application/json");
        assert_eq!(response.json_value().unwrap()["a"], 1);
    }

    #[test]
    fn test_error_helpers() {
        let response = TestResponse::from(ApiResponse::error(&ApiError::not_found("gone")));
        response.assert_error(ErrorCode::NotFound);
        assert_eq!(response.error_body().unwrap().message, "gone");
    }

    #[test]
    fn test_empty_body() {
        let response = TestResponse::from(ApiResponse::no_content());
        assert!(response.text().is_none());
        assert!(matches!(response.json_value(), Err(TestError::EmptyBody)));
    }
}

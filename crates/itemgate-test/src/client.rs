//! In-memory client that drives a [`Router`] without sockets.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method};
use itemgate_core::ApiRequest;
use itemgate_router::Router;

use crate::error::TestError;
use crate::response::TestResponse;

/// A test client bound to a router.
///
/// ```ignore
/// let client = TestClient::new(router).with_bearer_token(jwt_for("alice"));
/// let response = client.get("/items?limit=5").send().await;
/// response.assert_status(StatusCode::OK);
/// ```
#[must_use]
pub struct TestClient {
    router: Arc<Router>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// Creates a client over `router`.
    pub fn new(router: Router) -> Self {
        Self::from_shared(Arc::new(router))
    }

    /// Creates a client over a shared router.
    pub fn from_shared(router: Arc<Router>) -> Self {
        Self {
            router,
            default_headers: Vec::new(),
        }
    }

    /// Adds a header sent with every request.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sends `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("Bearer {}", token.as_ref());
        self.with_default_header(AUTHORIZATION.as_str(), value)
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        TestClientRequest {
            client: self,
            method,
            uri: uri.into(),
            headers: self.default_headers.clone(),
            body: None,
        }
    }
}

/// A request being built against a [`TestClient`].
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl TestClientRequest<'_> {
    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets `Authorization: Bearer <token>`, replacing any default.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        self.header(AUTHORIZATION.as_str(), format!("Bearer {}", token.as_ref()))
    }

    /// Drops any `Authorization` header.
    pub fn without_auth(mut self) -> Self {
        self.headers
            .retain(|(name, _)| !name.eq_ignore_ascii_case(AUTHORIZATION.as_str()));
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body and content type.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Self {
        let body = serde_json::to_string(value).expect("test body should serialize");
        self.header(CONTENT_TYPE.as_str(), "application/json").body(body)
    }

    /// Builds the request without sending it.
    pub fn build(self) -> Result<ApiRequest, TestError> {
        let (path, query) = match self.uri.split_once('?') {
            Some((path, query)) => (path.to_string(), decode_query(query)?),
            None => (self.uri.clone(), HashMap::new()),
        };

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TestError::InvalidHeader(format!("{name}: {e}")))?;
            headers.append(name, value);
        }

        let mut request = ApiRequest::new(self.method, path)
            .with_headers(headers)
            .with_query_params(query);
        if let Some(body) = self.body {
            request = request.with_body(body);
        }
        Ok(request)
    }

    /// Dispatches the request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built.
    pub async fn send(self) -> TestResponse {
        self.try_send().await.expect("request should build")
    }

    /// Dispatches the request, reporting build failures.
    pub async fn try_send(self) -> Result<TestResponse, TestError> {
        let router = Arc::clone(&self.client.router);
        let request = self.build()?;
        Ok(TestResponse::from(router.dispatch(request).await))
    }
}

fn decode_query(query: &str) -> Result<HashMap<String, String>, TestError> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(query)
        .map(|pairs| pairs.into_iter().collect())
        .map_err(|e| TestError::InvalidQuery(e.to_string()))
}

//! The request shape handed to the router and its handlers.
//!
//! [`ApiRequest`] is host-neutral: the HTTP host and the proxy-event host
//! both build one from their own wire format. The router fills in the
//! matched path [`Params`] and, on gated routes, the [`Principal`] before
//! the handler runs.

use std::collections::HashMap;

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::identity::Principal;
use crate::params::Params;

/// Message returned when a JSON body is missing or cannot be parsed.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

/// An incoming API request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Option<String>,
    params: Params,
    principal: Option<Principal>,
}

impl ApiRequest {
    /// Creates a request with no headers, query parameters or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: HashMap::new(),
            body: None,
            params: Params::new(),
            principal: None,
        }
    }

    /// Appends a header. Invalid names or values are dropped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::debug!(header = name, "dropping invalid request header"),
        }
        self
    }

    /// Replaces all headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets a query string parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Replaces all query string parameters.
    #[must_use]
    pub fn with_query_params(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Sets the raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a query string parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns all query string parameters.
    #[must_use]
    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Returns the matched path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns a single path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns the authenticated principal, if the route was gated.
    #[must_use]
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Binds the matched path parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Binds the authenticated principal.
    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    /// Returns a required path parameter.
    ///
    /// A handler bound to a template that declares `name` always finds it,
    /// so a miss is a wiring mistake and reported as an internal error.
    pub fn require_param(&self, name: &str) -> Result<&str, ApiError> {
        self.param(name)
            .ok_or_else(|| ApiError::internal(format!("missing path parameter '{name}'")))
    }

    /// Parses the body as JSON.
    ///
    /// A missing, blank or malformed body is a validation error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = self
            .body()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| ApiError::validation(INVALID_BODY_MESSAGE))?;

        serde_json::from_str(body).map_err(|e| {
            tracing::debug!(error = %e, "failed to parse request body");
            ApiError::validation(INVALID_BODY_MESSAGE)
        })
    }
}

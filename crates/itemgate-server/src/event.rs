//! Proxy-event host.
//!
//! Accepts the API-Gateway-style envelope used by function runtimes:
//!
//! ```json
//! {"httpMethod":"GET","path":"/items","headers":{"Authorization":"Bearer ..."},
//!  "queryStringParameters":{"limit":"5"},"body":null,"isBase64Encoded":false}
//! ```
//!
//! and answers with `{"statusCode":200,"headers":{...},"body":"..."}`.
//! Fields the envelope carries beyond these are ignored.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use itemgate_core::{ApiError, ApiRequest, ApiResponse, INVALID_BODY_MESSAGE};
use itemgate_router::Router;
use serde::{Deserialize, Serialize};

use crate::error::ServerResult;

/// Message for an event whose method is not a valid HTTP token.
pub const INVALID_METHOD_MESSAGE: &str = "Invalid HTTP method";

/// An incoming proxy event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    /// Request method.
    pub http_method: String,
    /// Request path.
    pub path: String,
    /// Single-value headers.
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Query string parameters.
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// Raw body.
    #[serde(default)]
    pub body: Option<String>,
    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyEvent {
    /// Creates an event with no headers, query or body.
    #[must_use]
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Adds a query string parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets a plain-text body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Converts the event into an [`ApiRequest`].
    ///
    /// An unparseable method token, or a body that is not valid base64 or
    /// UTF-8, is a caller error. Header names that differ only in case keep
    /// one value: the spelling that sorts last wins.
    pub fn into_api_request(self) -> Result<ApiRequest, ApiError> {
        let method = Method::from_bytes(self.http_method.as_bytes())
            .map_err(|_| ApiError::validation(INVALID_METHOD_MESSAGE))?;

        let mut request = ApiRequest::new(method, self.path)
            .with_headers(header_map(self.headers.unwrap_or_default()))
            .with_query_params(self.query_string_parameters.unwrap_or_default());

        let body = match self.body {
            Some(body) if self.is_base64_encoded => Some(
                decode_body(&body).ok_or_else(|| ApiError::validation(INVALID_BODY_MESSAGE))?,
            ),
            other => other,
        };
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            request = request.with_body(body);
        }
        Ok(request)
    }
}

fn header_map(headers: HashMap<String, String>) -> HeaderMap {
    let sorted: BTreeMap<String, String> = headers.into_iter().collect();
    let mut map = HeaderMap::with_capacity(sorted.len());
    for (name, value) in sorted {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                map.insert(name, value);
            }
            _ => tracing::debug!(header = %name, "dropping invalid event header"),
        }
    }
    map
}

fn decode_body(encoded: &str) -> Option<String> {
    let bytes = STANDARD.decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}

/// The response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Response body; omitted when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl From<ApiResponse> for ProxyResponse {
    fn from(response: ApiResponse) -> Self {
        let (status, headers, body) = response.into_parts();
        let headers = headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

/// Dispatches proxy events through a [`Router`].
#[derive(Debug, Clone)]
pub struct EventHost {
    router: Arc<Router>,
}

impl EventHost {
    /// Creates a host for `router`.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self { router }
    }

    /// Handles one event.
    pub async fn handle(&self, event: ProxyEvent) -> ProxyResponse {
        let response = match event.into_api_request() {
            Ok(request) => self.router.dispatch(request).await,
            Err(e) => ApiResponse::error(&e),
        };
        response.into()
    }

    /// Handles one JSON-encoded event and returns the JSON response.
    pub async fn handle_json(&self, input: &str) -> ServerResult<String> {
        let event: ProxyEvent = serde_json::from_str(input)?;
        tracing::debug!(http.method = %event.http_method, http.path = %event.path, "handling event");
        let response = self.handle(event).await;
        Ok(serde_json::to_string(&response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use itemgate_core::ApiResult;
    use itemgate_router::{AuthGate, StaticTokenValidator};

    use crate::error::ServerError;

    async fn echo(request: ApiRequest) -> ApiResult<ApiResponse> {
        Ok(ApiResponse::ok(&serde_json::json!({
            "body": request.body(),
            "limit": request.query("limit"),
            "subject": request.principal().map(|p| p.subject().to_string()),
        })))
    }

    fn host() -> EventHost {
        let mut router = Router::new(AuthGate::default());
        router.register(Method::POST, "/echo", echo, true).unwrap();
        EventHost::new(Arc::new(router))
    }

    fn body(response: &ProxyResponse) -> serde_json::Value {
        serde_json::from_str(response.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_event_deserializes_gateway_shape() {
        let event: ProxyEvent = serde_json::from_str(
            r#"{
                "resource": "/items",
                "httpMethod": "GET",
                "path": "/items",
                "headers": null,
                "queryStringParameters": {"limit": "3"},
                "requestContext": {"stage": "prod"},
                "body": null,
                "isBase64Encoded": false
            }"#,
        )
        .unwrap();
        assert_eq!(event.http_method, "GET");
        assert!(event.headers.is_none());
        let request = event.into_api_request().unwrap();
        assert_eq!(request.query("limit"), Some("3"));
    }

    #[tokio::test]
    async fn test_handle_plain_body() {
        let event = ProxyEvent::new("POST", "/echo")
            .with_header("authorization", "Bearer a.b.c")
            .with_query("limit", "9")
            .with_body("hello");
        let response = host().handle(event).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        let json = body(&response);
        assert_eq!(json["body"], "hello");
        assert_eq!(json["limit"], "9");
        assert_eq!(json["subject"], "user-123");
    }

    #[tokio::test]
    async fn test_handle_base64_body() {
        let mut event = ProxyEvent::new("POST", "/echo").with_header("Authorization", "Bearer a.b.c");
        event.body = Some(STANDARD.encode("decoded"));
        event.is_base64_encoded = true;
        let response = host().handle(event).await;
        assert_eq!(body(&response)["body"], "decoded");
    }

    #[tokio::test]
    async fn test_handle_bad_base64_body() {
        let mut event = ProxyEvent::new("POST", "/echo").with_header("Authorization", "Bearer a.b.c");
        event.body = Some("***".to_string());
        event.is_base64_encoded = true;
        let response = host().handle(event).await;
        assert_eq!(response.status_code, StatusCode::BAD_REQUEST.as_u16());
        assert_eq!(body(&response)["message"], INVALID_BODY_MESSAGE);
    }

    #[test]
    fn test_case_variant_headers_keep_one_value() {
        for _ in 0..16 {
            let request = ProxyEvent::new("GET", "/items")
                .with_header("Authorization", "Bearer upper")
                .with_header("authorization", "Bearer lower")
                .with_header("bad header", "dropped")
                .into_api_request()
                .unwrap();
            let values: Vec<_> = request.headers().get_all("authorization").iter().collect();
            assert_eq!(values, ["Bearer lower"]);
            assert_eq!(request.headers().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_case_variant_headers_pick_same_principal() {
        let gate = AuthGate::new(
            StaticTokenValidator::default()
                .with_token("upper", "alice")
                .with_token("lower", "bob"),
        );
        let mut router = Router::new(gate);
        router.register(Method::POST, "/echo", echo, true).unwrap();
        let host = EventHost::new(Arc::new(router));

        let event = ProxyEvent::new("POST", "/echo")
            .with_header("Authorization", "Bearer upper")
            .with_header("authorization", "Bearer lower");
        let response = host.handle(event).await;
        assert_eq!(body(&response)["subject"], "bob");
    }

    #[tokio::test]
    async fn test_handle_unauthorized() {
        let response = host().handle(ProxyEvent::new("POST", "/echo")).await;
        assert_eq!(response.status_code, 401);
        assert_eq!(body(&response)["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_handle_invalid_method() {
        let response = host().handle(ProxyEvent::new("GE T", "/echo")).await;
        assert_eq!(response.status_code, 400);
        assert_eq!(body(&response)["message"], INVALID_METHOD_MESSAGE);
    }

    #[tokio::test]
    async fn test_handle_json_round_trip() {
        let output = host()
            .handle_json(r#"{"httpMethod":"GET","path":"/nope"}"#)
            .await
            .unwrap();
        let response: ProxyResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(
            response.headers.get("access-control-allow-origin").map(String::as_str),
            Some("*")
        );
    }

    #[tokio::test]
    async fn test_handle_json_rejects_garbage() {
        let err = host().handle_json("not json").await.unwrap_err();
        assert!(matches!(err, ServerError::Json(_)));
    }

    #[test]
    fn test_no_content_omits_body() {
        let response = ProxyResponse::from(ApiResponse::no_content());
        assert_eq!(response.status_code, 204);
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("body").is_none());
    }
}

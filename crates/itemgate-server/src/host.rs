//! HTTP host.
//!
//! Accepts HTTP/1 connections with hyper, converts each request into an
//! [`ApiRequest`], dispatches it through the [`Router`] and writes the
//! [`ApiResponse`] back. Reading the body and dispatch share one deadline.

use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::request::Parts;
use http::{Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use itemgate_core::{ApiError, ApiRequest, ApiResponse, ErrorBody, ErrorCode, INVALID_BODY_MESSAGE};
use itemgate_router::Router;
use tokio::net::{TcpListener, TcpStream};

use crate::error::{ServerError, ServerResult};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Message sent when a request exceeds the request timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timed out";

/// Response body type written by the host.
pub type HttpResponse = Response<Full<Bytes>>;

/// Serves a [`Router`] over HTTP/1.
#[derive(Debug, Clone)]
pub struct HttpHost {
    router: Arc<Router>,
    request_timeout: Duration,
    shutdown_timeout: Duration,
}

impl HttpHost {
    /// Creates a host with 30 second request and shutdown timeouts.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the per-request deadline, covering body reads and dispatch.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets how long shutdown waits for open connections.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Binds `addr` and serves until `shutdown` triggers.
    pub async fn run(self, addr: SocketAddr, shutdown: ShutdownSignal) -> ServerResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from `listener` until `shutdown` triggers, then
    /// waits up to the shutdown timeout for open connections to finish.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> ServerResult<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "listening");

        let host = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let host = Arc::clone(&host);
                        let guard = tracker.track();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            if let Err(e) = host.serve_connection(stream, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "connection error");
                            }
                            drop(guard);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.triggered() => break,
            }
        }

        tracing::info!(
            connections = tracker.active(),
            timeout_secs = host.shutdown_timeout.as_secs(),
            "draining connections"
        );
        if tokio::time::timeout(host.shutdown_timeout, tracker.drained())
            .await
            .is_err()
        {
            tracing::warn!(
                connections = tracker.active(),
                "shutdown timeout reached with open connections"
            );
        }
        tracing::info!("server stopped");
        Ok(())
    }

    async fn serve_connection(
        self: Arc<Self>,
        stream: TcpStream,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let host = Arc::clone(&self);
        let service = service_fn(move |req: Request<Incoming>| {
            let host = Arc::clone(&host);
            async move { Ok::<_, Infallible>(host.handle(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.triggered() => {
                conn.as_mut().graceful_shutdown();
                conn.await
            }
        }
    }

    async fn handle(&self, req: Request<Incoming>) -> HttpResponse {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let response = self.within_deadline(&method, &path, self.respond(req)).await;
        into_http_response(response)
    }

    async fn respond(&self, req: Request<Incoming>) -> ApiResponse {
        let (parts, body) = req.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                tracing::debug!(error = %e, "failed to read request body");
                return ApiResponse::error(&ApiError::validation(INVALID_BODY_MESSAGE));
            }
        };

        match into_api_request(parts, &bytes) {
            Ok(request) => self.router.dispatch(request).await,
            Err(e) => ApiResponse::error(&e),
        }
    }

    /// Dispatches an already-read request under the request timeout.
    pub async fn dispatch(&self, request: ApiRequest) -> ApiResponse {
        let method = request.method().clone();
        let path = request.path().to_string();
        self.within_deadline(&method, &path, self.router.dispatch(request))
            .await
    }

    async fn within_deadline(
        &self,
        method: &Method,
        path: &str,
        work: impl Future<Output = ApiResponse>,
    ) -> ApiResponse {
        match tokio::time::timeout(self.request_timeout, work).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(
                    http.method = %method,
                    http.path = %path,
                    timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX),
                    "request timed out"
                );
                timeout_response()
            }
        }
    }
}

/// The response sent when a request exceeds its deadline.
///
/// The status follows the `INTERNAL_SERVER_ERROR` code it carries.
#[must_use]
pub fn timeout_response() -> ApiResponse {
    let code = ErrorCode::InternalServerError;
    ApiResponse::error_body(code.status_code(), &ErrorBody::new(code, TIMEOUT_MESSAGE))
}

/// Builds an [`ApiRequest`] from request head and collected body.
///
/// An empty body becomes `None`. A body that is not UTF-8 is rejected as a
/// bad request. An undecodable query string is treated as empty; repeated
/// keys keep the last value.
pub fn into_api_request(parts: Parts, body: &[u8]) -> Result<ApiRequest, ApiError> {
    let query = parts
        .uri
        .query()
        .map(parse_query)
        .unwrap_or_default();

    let mut request = ApiRequest::new(parts.method, parts.uri.path())
        .with_headers(parts.headers)
        .with_query_params(query);

    if !body.is_empty() {
        let text = std::str::from_utf8(body)
            .map_err(|_| ApiError::validation(INVALID_BODY_MESSAGE))?;
        request = request.with_body(text);
    }
    Ok(request)
}

fn parse_query(raw: &str) -> HashMap<String, String> {
    match serde_urlencoded::from_str::<Vec<(String, String)>>(raw) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring undecodable query string");
            HashMap::new()
        }
    }
}

/// Converts an [`ApiResponse`] into a hyper response.
#[must_use]
pub fn into_http_response(response: ApiResponse) -> HttpResponse {
    let (status, headers, body) = response.into_parts();
    let mut http = Response::new(Full::new(body.map(Bytes::from).unwrap_or_default()));
    *http.status_mut() = status;
    *http.headers_mut() = headers;
    http
}

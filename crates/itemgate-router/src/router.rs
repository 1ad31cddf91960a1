//! Route table and dispatch.
//!
//! Dispatch runs in a fixed order:
//!
//! 1. Exact match of (method, path) against literal templates.
//! 2. Otherwise the first parameterized template, in registration order,
//!    whose compiled pattern matches.
//! 3. No match: `404 NOT_FOUND`.
//! 4. Gated route: the [`AuthGate`] must yield a principal, else
//!    `401 UNAUTHORIZED` and the handler never runs.
//! 5. The handler's response is returned as is; its errors are mapped to
//!    their status. A panic inside the handler becomes `500`.
//!
//! # Example
//!
//! ```rust
//! use http::{Method, StatusCode};
//! use itemgate_core::{ApiRequest, ApiResponse};
//! use itemgate_router::{AuthGate, Router};
//!
//! # tokio_test_block_on(async {
//! let mut router = Router::new(AuthGate::default());
//! router
//!     .register(Method::GET, "/ping", |_req: ApiRequest| async {
//!         Ok(ApiResponse::ok(&"pong"))
//!     }, false)
//!     .unwrap();
//!
//! let response = router.dispatch(ApiRequest::new(Method::GET, "/ping")).await;
//! assert_eq!(response.status(), StatusCode::OK);
//!
//! let response = router.dispatch(ApiRequest::new(Method::GET, "/pong")).await;
//! assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures_util::FutureExt;
use http::Method;
use itemgate_core::{ApiError, ApiRequest, ApiResponse, ApiResult, Params};
use itemgate_telemetry::metrics::{record_request, InFlightGuard, UNMATCHED_ROUTE};
use tracing::Instrument;

use crate::auth::AuthGate;
use crate::error::{RouterError, RouterResult};
use crate::handler::{erase, ErasedHandler};
use crate::pattern::{PathPattern, PatternCache};

/// Message of the 404 returned when no route matches.
pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Resource not found";

struct Route {
    method: Method,
    pattern: PathPattern,
    handler: ErasedHandler,
    requires_auth: bool,
    label: String,
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.template())
            .field("requires_auth", &self.requires_auth)
            .finish_non_exhaustive()
    }
}

/// The result of matching a request against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    template: &'a str,
    requires_auth: bool,
    params: Params,
}

impl RouteMatch<'_> {
    /// Template of the matched route.
    #[must_use]
    pub fn template(&self) -> &str {
        self.template
    }

    /// Whether the matched route is gated.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// Bound path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }
}

/// Maps (method, path) to handlers and enforces the auth gate.
///
/// Built once at startup and then shared read-only across requests.
#[derive(Debug)]
pub struct Router {
    gate: AuthGate,
    literal: HashMap<(Method, String), Route>,
    parameterized: Vec<Route>,
    cache: PatternCache,
}

impl Router {
    /// Creates an empty router using `gate` for gated routes.
    #[must_use]
    pub fn new(gate: AuthGate) -> Self {
        Self {
            gate,
            literal: HashMap::new(),
            parameterized: Vec::new(),
            cache: PatternCache::new(),
        }
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateRoute`] if (method, pattern) is
    /// already registered and [`RouterError::InvalidPattern`] if the
    /// pattern is malformed.
    pub fn register<F, Fut>(
        &mut self,
        method: Method,
        pattern: &str,
        handler: F,
        requires_auth: bool,
    ) -> RouterResult<()>
    where
        F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<ApiResponse>> + Send + 'static,
    {
        if self.contains(&method, pattern) {
            return Err(RouterError::DuplicateRoute {
                method,
                pattern: pattern.to_string(),
            });
        }

        let pattern = PathPattern::parse(pattern, &mut self.cache)?;
        let route = Route {
            label: format!("{method} {}", pattern.template()),
            method,
            pattern,
            handler: erase(handler),
            requires_auth,
        };
        tracing::debug!(route = %route.label, requires_auth, "registered route");

        if route.pattern.is_literal() {
            let key = (route.method.clone(), route.pattern.template().to_string());
            self.literal.insert(key, route);
        } else {
            self.parameterized.push(route);
        }
        Ok(())
    }

    /// Returns `true` if (method, pattern) is registered.
    #[must_use]
    pub fn contains(&self, method: &Method, pattern: &str) -> bool {
        self.literal
            .contains_key(&(method.clone(), pattern.to_string()))
            || self
                .parameterized
                .iter()
                .any(|r| r.method == *method && r.pattern.template() == pattern)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.literal.len() + self.parameterized.len()
    }

    /// Returns `true` if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Matches a request without running it.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.find(method, path).map(|(route, params)| RouteMatch {
            template: route.pattern.template(),
            requires_auth: route.requires_auth,
            params,
        })
    }

    fn find(&self, method: &Method, path: &str) -> Option<(&Route, Params)> {
        if let Some(route) = self.literal.get(&(method.clone(), path.to_string())) {
            return Some((route, Params::new()));
        }
        self.parameterized
            .iter()
            .filter(|r| r.method == *method)
            .find_map(|r| r.pattern.match_path(path).map(|params| (r, params)))
    }

    /// Routes a request to its handler and returns the response.
    ///
    /// Never fails: every outcome, including a handler panic, is turned
    /// into a response.
    pub async fn dispatch(&self, mut request: ApiRequest) -> ApiResponse {
        let started = Instant::now();
        let _in_flight = InFlightGuard::new();
        let span = tracing::info_span!(
            "dispatch",
            http.method = %request.method(),
            http.path = %request.path(),
        );

        let (label, response) = async {
            let Some((route, params)) = self.find(request.method(), request.path()) else {
                tracing::debug!("no route matched");
                let error = ApiError::not_found(ROUTE_NOT_FOUND_MESSAGE);
                return (UNMATCHED_ROUTE, ApiResponse::error(&error));
            };
            request.set_params(params);

            let response = AssertUnwindSafe(self.invoke(route, request))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| {
                    tracing::error!(
                        route = %route.label,
                        panic = panic_message(panic.as_ref()),
                        "handler panicked"
                    );
                    ApiResponse::error(&ApiError::internal("handler panicked"))
                });
            (route.label.as_str(), response)
        }
        .instrument(span.clone())
        .await;

        let elapsed = started.elapsed();
        let status = response.status().as_u16();
        span.in_scope(|| {
            tracing::info!(
                route = label,
                http.status_code = status,
                duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );
        });
        record_request(label, status, elapsed);
        response
    }

    async fn invoke(&self, route: &Route, mut request: ApiRequest) -> ApiResponse {
        if route.requires_auth {
            match self.gate.authenticate(request.headers()).await {
                Some(principal) => {
                    tracing::debug!(user_id = %principal.subject(), "authenticated");
                    request.set_principal(principal);
                }
                None => {
                    tracing::debug!(route = %route.label, "rejecting unauthenticated request");
                    return ApiResponse::error(&ApiError::unauthorized());
                }
            }
        }

        match (route.handler)(request).await {
            Ok(response) => response,
            Err(error) => {
                if error.is_internal() {
                    tracing::error!(route = %route.label, error = ?error, "handler failed");
                } else {
                    tracing::debug!(route = %route.label, error = %error, "handler rejected request");
                }
                ApiResponse::error(&error)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

//! Type-erased route handlers.
//!
//! Any `Fn(ApiRequest) -> impl Future<Output = ApiResult<ApiResponse>>`
//! can be registered; it is boxed into an [`ErasedHandler`] so routes with
//! different closure types live in one table.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use itemgate_core::{ApiRequest, ApiResponse, ApiResult};

/// Boxed handler future.
pub type HandlerFuture = Pin<Box<dyn Future<Output = ApiResult<ApiResponse>> + Send>>;

/// A type-erased handler.
pub type ErasedHandler = Arc<dyn Fn(ApiRequest) -> HandlerFuture + Send + Sync>;

/// Erases a handler function.
pub fn erase<F, Fut>(handler: F) -> ErasedHandler
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<ApiResponse>> + Send + 'static,
{
    Arc::new(move |request: ApiRequest| -> HandlerFuture { Box::pin(handler(request)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use itemgate_core::ApiError;

    #[tokio::test]
    async fn test_erased_handler_runs() {
        let handler = erase(|request: ApiRequest| async move {
            Ok(ApiResponse::ok(&serde_json::json!({ "path": request.path() })))
        });

        let response = handler(ApiRequest::new(Method::GET, "/x")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), Some(r#"{"path":"/x"}"#));
    }

    #[tokio::test]
    async fn test_erased_handler_propagates_error() {
        let handler = erase(|_request: ApiRequest| async { Err(ApiError::validation("nope")) });
        let err = handler(ApiRequest::new(Method::POST, "/x")).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}

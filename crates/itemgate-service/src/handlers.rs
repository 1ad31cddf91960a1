//! One handler per route.
//!
//! Handlers translate an [`ApiRequest`] into [`ItemService`] calls and
//! shape the response. They return `ApiError` for every failure; the
//! router turns it into the error body.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use itemgate_core::{ApiError, ApiRequest, ApiResponse, ApiResult, ItemUpdate, NewItem};
use serde::{Deserialize, Serialize};

use crate::service::{page_limit, ItemService};

/// Path parameter naming the target item.
pub const ITEM_ID_PARAM: &str = "itemId";

/// Message of the public endpoint.
pub const PUBLIC_MESSAGE: &str = "This is public data that anyone can access";

/// Message of the protected endpoint.
pub const PROTECTED_MESSAGE: &str =
    "This is protected data that only authenticated users can access";

/// Body of `GET /public`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicData {
    /// Fixed greeting.
    pub message: String,
    /// Time of the response.
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /protected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectedData {
    /// Fixed greeting.
    pub message: String,
    /// Subject of the authenticated caller.
    pub user_id: String,
    /// Time of the response.
    pub timestamp: DateTime<Utc>,
}

/// `GET /public`
pub async fn public_data(service: Arc<ItemService>, _request: ApiRequest) -> ApiResult<ApiResponse> {
    Ok(ApiResponse::ok(&PublicData {
        message: PUBLIC_MESSAGE.to_string(),
        timestamp: service.now(),
    }))
}

/// `GET /protected`
pub async fn protected_data(
    service: Arc<ItemService>,
    request: ApiRequest,
) -> ApiResult<ApiResponse> {
    let principal = request.principal().ok_or_else(ApiError::unauthorized)?;
    Ok(ApiResponse::ok(&ProtectedData {
        message: PROTECTED_MESSAGE.to_string(),
        user_id: principal.subject().to_string(),
        timestamp: service.now(),
    }))
}

/// `GET /items?limit=N`
pub async fn list_items(service: Arc<ItemService>, request: ApiRequest) -> ApiResult<ApiResponse> {
    let limit = page_limit(request.query("limit"));
    let items = service.list(limit).await?;
    Ok(ApiResponse::ok(&items))
}

/// `POST /items`
pub async fn create_item(service: Arc<ItemService>, request: ApiRequest) -> ApiResult<ApiResponse> {
    let input: NewItem = request.json()?;
    let item = service.create(input).await?;
    Ok(ApiResponse::created(&item))
}

/// `GET /items/{itemId}`
pub async fn get_item(service: Arc<ItemService>, request: ApiRequest) -> ApiResult<ApiResponse> {
    let id = request.require_param(ITEM_ID_PARAM)?;
    let item = service.get(id).await?;
    Ok(ApiResponse::ok(&item))
}

/// `PUT /items/{itemId}`
pub async fn update_item(service: Arc<ItemService>, request: ApiRequest) -> ApiResult<ApiResponse> {
    let id = request.require_param(ITEM_ID_PARAM)?;
    let input: ItemUpdate = request.json()?;
    let item = service.update(id, input).await?;
    Ok(ApiResponse::ok(&item))
}

/// `DELETE /items/{itemId}`
pub async fn delete_item(service: Arc<ItemService>, request: ApiRequest) -> ApiResult<ApiResponse> {
    let id = request.require_param(ITEM_ID_PARAM)?;
    service.delete(id).await?;
    Ok(ApiResponse::no_content())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use itemgate_core::fixtures::{fixed_instant, ManualClock};
    use itemgate_core::{ErrorCode, Params, Principal, INVALID_BODY_MESSAGE};
    use itemgate_store::MemoryItemStore;

    fn service() -> Arc<ItemService> {
        Arc::new(ItemService::new(
            MemoryItemStore::new_shared(),
            Arc::new(ManualClock::at_epoch()),
        ))
    }

    fn with_item_id(mut request: ApiRequest, id: &str) -> ApiRequest {
        let mut params = Params::new();
        params.push(ITEM_ID_PARAM, id);
        request.set_params(params);
        request
    }

    #[tokio::test]
    async fn test_public_data() {
        let response = public_data(service(), ApiRequest::new(Method::GET, "/public"))
            .await
            .unwrap();
        let body: PublicData = serde_json::from_str(response.body().unwrap()).unwrap();
        assert_eq!(body.message, PUBLIC_MESSAGE);
        assert_eq!(body.timestamp, fixed_instant());
    }

    #[tokio::test]
    async fn test_protected_data_uses_principal() {
        let mut request = ApiRequest::new(Method::GET, "/protected");
        request.set_principal(Principal::new("user-123"));
        let response = protected_data(service(), request).await.unwrap();

        let body: serde_json::Value = serde_json::from_str(response.body().unwrap()).unwrap();
        assert_eq!(body["userId"], "user-123");
        assert_eq!(body["message"], PROTECTED_MESSAGE);
    }

    #[tokio::test]
    async fn test_protected_data_without_principal() {
        let err = protected_data(service(), ApiRequest::new(Method::GET, "/protected"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_create_item_bad_json() {
        for body in ["", "   ", "{not json", "42"] {
            let request = ApiRequest::new(Method::POST, "/items").with_body(body);
            let err = create_item(service(), request).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::BadRequest);
            assert_eq!(err.to_body().message, INVALID_BODY_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let service = service();
        let request = ApiRequest::new(Method::POST, "/items").with_body(r#"{"name":"n"}"#);
        let response = create_item(Arc::clone(&service), request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created: serde_json::Value = serde_json::from_str(response.body().unwrap()).unwrap();
        let id = created["id"].as_str().unwrap();

        let request = with_item_id(ApiRequest::new(Method::GET, "/items/x"), id);
        let response = get_item(service, request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_item_without_param_is_internal() {
        let err = get_item(service(), ApiRequest::new(Method::GET, "/items/x"))
            .await
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn test_delete_item_returns_no_content() {
        let request = with_item_id(ApiRequest::new(Method::DELETE, "/items/x"), "x");
        let response = delete_item(service(), request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_none());
    }
}

//! Route table wiring.

use std::future::Future;
use std::sync::Arc;

use http::Method;
use itemgate_core::{ApiRequest, ApiResponse, ApiResult};
use itemgate_router::{AuthGate, Router, RouterResult};

use crate::handlers;
use crate::service::ItemService;

/// Public greeting.
pub const PUBLIC_PATH: &str = "/public";
/// Authenticated greeting.
pub const PROTECTED_PATH: &str = "/protected";
/// Item collection.
pub const ITEMS_PATH: &str = "/items";
/// Single item.
pub const ITEM_PATH: &str = "/items/{itemId}";

/// Builds the router with every API route registered.
///
/// | Method | Path | Gated |
/// |---|---|---|
/// | GET | `/public` | no |
/// | GET | `/protected` | yes |
/// | GET, POST | `/items` | yes |
/// | GET, PUT, DELETE | `/items/{itemId}` | yes |
pub fn build_router(service: Arc<ItemService>, gate: AuthGate) -> RouterResult<Router> {
    let mut router = Router::new(gate);

    router.register(Method::GET, PUBLIC_PATH, bind(&service, handlers::public_data), false)?;
    router.register(Method::GET, PROTECTED_PATH, bind(&service, handlers::protected_data), true)?;
    router.register(Method::GET, ITEMS_PATH, bind(&service, handlers::list_items), true)?;
    router.register(Method::POST, ITEMS_PATH, bind(&service, handlers::create_item), true)?;
    router.register(Method::GET, ITEM_PATH, bind(&service, handlers::get_item), true)?;
    router.register(Method::PUT, ITEM_PATH, bind(&service, handlers::update_item), true)?;
    router.register(Method::DELETE, ITEM_PATH, bind(&service, handlers::delete_item), true)?;

    Ok(router)
}

fn bind<F, Fut>(
    service: &Arc<ItemService>,
    handler: F,
) -> impl Fn(ApiRequest) -> Fut + Send + Sync + 'static
where
    F: Fn(Arc<ItemService>, ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ApiResult<ApiResponse>> + Send + 'static,
{
    let service = Arc::clone(service);
    move |request| handler(Arc::clone(&service), request)
}

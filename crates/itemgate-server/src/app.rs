//! Wiring from configuration to a ready [`Router`].

use std::collections::HashMap;
use std::sync::Arc;

use itemgate_config::{AuthConfig, ItemgateConfig, ValidatorKind};
use itemgate_core::{Clock, SystemClock};
use itemgate_router::{AuthGate, Router, StaticTokenValidator, UnverifiedJwtValidator};
use itemgate_service::{build_router, ItemService};
use itemgate_store::{ItemStore, MemoryItemStore};

use crate::error::ServerResult;

/// Builds the auth gate described by `auth`.
#[must_use]
pub fn build_gate(auth: &AuthConfig) -> AuthGate {
    match auth.validator {
        ValidatorKind::UnverifiedJwt => {
            AuthGate::new(UnverifiedJwtValidator::new(auth.default_subject.clone()))
        }
        ValidatorKind::Static => {
            let tokens: HashMap<String, String> = auth
                .static_tokens
                .iter()
                .map(|(token, subject)| (token.clone(), subject.clone()))
                .collect();
            AuthGate::new(StaticTokenValidator::new(tokens))
        }
    }
}

/// Builds the application router over `store` and `clock`.
pub fn build_app(
    config: &ItemgateConfig,
    store: Arc<dyn ItemStore>,
    clock: Arc<dyn Clock>,
) -> ServerResult<Arc<Router>> {
    let service = Arc::new(ItemService::new(store, clock));
    let router = build_router(service, build_gate(&config.auth))?;
    tracing::info!(
        routes = router.len(),
        validator = ?config.auth.validator,
        "router ready"
    );
    Ok(Arc::new(router))
}

/// Builds the application router over an in-memory store and the system
/// clock.
pub fn build_default_app(config: &ItemgateConfig) -> ServerResult<Arc<Router>> {
    build_app(config, MemoryItemStore::new_shared(), Arc::new(SystemClock))
}

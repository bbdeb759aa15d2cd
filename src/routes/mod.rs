//! Routers and the HTTP layers shared by every service built on this crate.

mod common;
mod crud;

pub use common::common_routes;
pub use crud::crud_routes;

use crate::config::ServerConfig;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Wrap `router` with request tracing (outermost) and the configured body size limit.
pub fn layered(router: Router, config: &ServerConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.max_body_bytes)),
    )
}

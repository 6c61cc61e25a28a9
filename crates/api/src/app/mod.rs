//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store wiring (document store, object store, reconciler)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(router_with_services(Arc::new(services), config.max_photo_bytes))
}

/// Router over already-built services (tests wire their own stores).
pub fn router_with_services(services: Arc<services::AppServices>, max_photo_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router(max_photo_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_logging))
                .layer(Extension(services)),
        )
}

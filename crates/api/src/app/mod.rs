//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: composition root (store handle, per-request repository)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response models
//! - `errors.rs`: consistent error responses
//! - `versioning.rs`: URL-segment API versions

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;
pub mod versioning;

pub use services::{AppServices, StartupError};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> Result<Router, StartupError> {
    let services = services::build_services(config).await?;
    Ok(router_with_services(services))
}

/// Router over already-built services.
pub fn router_with_services(services: AppServices) -> Router {
    let default_version = services.default_version();

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router(default_version))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::trace_request))
                .layer(axum::middleware::map_response(versioning::report_supported_versions))
                .layer(Extension(Arc::new(services))),
        )
}

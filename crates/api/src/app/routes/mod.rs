use axum::{middleware::from_fn, middleware::from_fn_with_state, Router};

use crate::app::versioning::{self, ApiVersion};

pub mod camps;
pub mod system;
pub mod talks;

/// Camp routes, mounted once with the default version and once per URL version.
pub fn router(default_version: ApiVersion) -> Router {
    Router::new()
        .nest(
            "/api/camps",
            camps::router().route_layer(from_fn_with_state(default_version, versioning::assume_default)),
        )
        .nest(
            "/api/:version/camps",
            camps::router().route_layer(from_fn(versioning::read_url_segment)),
        )
}

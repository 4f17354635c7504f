//! Route tables and the assembled application.

mod common;
mod products;

pub use common::common_routes;
pub use products::product_routes;

use crate::config::{CorsConfig, GatewayConfig};
use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Everything the server mounts, with tracing, body limit and CORS applied.
pub fn build_app(state: AppState, config: &GatewayConfig) -> Router {
    let mut app = Router::new()
        .merge(common_routes())
        .merge(product_routes(state))
        .layer(RequestBodyLimitLayer::new(config.body_limit_bytes))
        .layer(TraceLayer::new_for_http());
    if let Some(cors) = cors_layer(&config.cors) {
        app = app.layer(cors);
    }
    app
}

pub fn cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    match cors {
        CorsConfig::Disabled => None,
        CorsConfig::AllowAll => Some(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
        CorsConfig::AllowOrigins(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            Some(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
            )
        }
    }
}

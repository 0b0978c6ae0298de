//! API layer - HTTP handlers and routing
//!
//! - Widget endpoint (`/widgets/{action}`)
//! - Cache purge endpoints
//! - Health endpoint

pub mod cache;
pub mod health;
pub mod middleware;
pub mod widgets;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub use middleware::{etag_matches, generate_etag, trace_layer, ApiError, ApiErrorDetail, AppState};

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/cache", delete(cache::clear_cache))
        .route("/cache/flush", post(cache::flush_cache))
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/widgets/{action}", get(widgets::get_widget))
        .nest("/api/v1", build_api_router())
        .layer(
            ServiceBuilder::new()
                .layer(trace_layer())
                .layer(CompressionLayer::new())
                .layer(cors_layer(cors_origin)),
        )
        .with_state(state)
}

fn cors_layer(cors_origin: &str) -> CorsLayer {
    let origin = if cors_origin == "*" {
        AllowOrigin::any()
    } else {
        match cors_origin.parse::<HeaderValue>() {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::warn!("Invalid CORS origin '{}', allowing any origin", cors_origin);
                AllowOrigin::any()
            }
        }
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::IF_NONE_MATCH])
        .expose_headers([
            header::ETAG,
            HeaderName::from_static(widgets::WIDGET_CACHE_HEADER),
            HeaderName::from_static(widgets::CACHE_TAGS_HEADER),
        ])
}

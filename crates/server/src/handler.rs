//! HTTP router and shared state.
//!
//! This module wires the routes to the resolver and applies the CORS
//! allow-list and request tracing.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use pagetitle_client::TitleResolver;
use pagetitle_core::CacheDb;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{health, titles};

/// Shared state for all handlers.
pub struct AppState {
    pub resolver: Arc<TitleResolver>,
    /// Same database the resolver's cache writes to.
    pub db: CacheDb,
}

/// Build the router with all routes.
///
/// `allowed_origins` must already be normalized (no trailing `/`). With no
/// usable origin the CORS layer is left out entirely.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/get-titles", post(titles::get_titles))
        .route("/get-title", post(titles::get_title))
        .route("/health", get(health::get_health))
        .with_state(state);

    let router = match cors_layer(allowed_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "skipping unusable CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}

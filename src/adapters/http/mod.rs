//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the training routes with request tracing and CORS.

pub mod training;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use training::{training_router, TrainingAppState};

/// Builds the full application router.
///
/// An empty `cors_origins` list allows any origin. Entries that are not
/// valid header values are skipped, so a list with no valid entry allows
/// none.
pub fn app_router(state: TrainingAppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(training::health))
        .merge(training_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(parsed))
}

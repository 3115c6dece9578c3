//! API Routes
//!
//! Configures the Axum router with all keyword gap endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    analyze_handler, clear_handler, delete_entry_handler, get_config_handler, health_handler,
    metadata_handler, set_config_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /analyze` - Run or recall a keyword gap analysis
/// - `GET /cache/config` / `PUT /cache/config` - Read or change cache expiration
/// - `GET /cache/stats` - Cache counters and size
/// - `GET /cache/entries/:key` - Age of a cached entry
/// - `DELETE /cache/entries/:key` - Drop one cached entry
/// - `DELETE /cache` - Drop every cached entry, config kept
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/analyze", post(analyze_handler))
        .route(
            "/cache/config",
            get(get_config_handler).put(set_config_handler),
        )
        .route("/cache/stats", get(stats_handler))
        .route(
            "/cache/entries/:key",
            get(metadata_handler).delete(delete_entry_handler),
        )
        .route("/cache", delete(clear_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

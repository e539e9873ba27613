//! Route definitions
//!
//! `/health` reports server and role cache status. Every other path is
//! handed to the dispatcher.

use crate::{handlers, middleware, state::AppState};
use axum::{middleware as axum_middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router with all routes and middleware
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .fallback(handlers::dispatch)
        .with_state(state)
        // Executed bottom to top
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(middleware::cors_layer())
        .layer(TraceLayer::new_for_http())
}

/**
 * Router Configuration
 *
 * Combines the route groups into one Axum router:
 * 1. Shopping-list routes (SSE streams, writes, directory)
 * 2. API routes (sessions, recipe book, images, push)
 * 3. Fallback handler (404)
 *
 * Every request runs inside a `TraceLayer` span.
 */

use axum::{http::StatusCode, Router};
use tower_http::trace::TraceLayer;

use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::routes::shopping_routes::configure_shopping_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_shopping_routes(Router::new());
    let router = configure_api_routes(router);

    router
        .fallback(|| async { (StatusCode::NOT_FOUND, "404 Not Found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

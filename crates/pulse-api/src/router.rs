//! Axum router construction.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for the browser map client.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health` -- liveness and backend names
/// - `GET /api/events` -- list events in a viewport
/// - `POST /api/events` -- ingest one classified event
/// - `POST /api/route` -- risk-aware route selection
///
/// CORS allows any origin, matching the map client's development setup.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::ingest_event),
        )
        .route("/api/route", post(handlers::plan_route))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

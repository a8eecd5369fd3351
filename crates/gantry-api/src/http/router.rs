//! Axum router configuration with middleware.
//!
//! Routes:
//! - `POST /webhook` - repository webhook receiver
//! - `GET /health`   - liveness probe
//!
//! Middleware: request tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use gantry_core::port::executor::BuildExecutor;
use gantry_core::port::snapshot::SnapshotProvider;

use crate::http::handlers;
use crate::state::AppState;

/// Build the router with all routes and middleware.
pub fn build_router<S, E>(state: AppState<S, E>) -> Router
where
    S: SnapshotProvider + 'static,
    E: BuildExecutor + 'static,
{
    Router::new()
        .route("/webhook", post(handlers::webhook::receive_webhook::<S, E>))
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

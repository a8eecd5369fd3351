//! Webhook HTTP server.
//!
//! Axum-based API with an envelope response format. `POST /webhook` runs one
//! orchestrator invocation per request; `GET /health` reports liveness.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;

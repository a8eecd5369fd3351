//! Liveness endpoint.

use std::time::Instant;

use axum::Json;
use uuid::Uuid;

use crate::http::response::ApiResponse;

/// GET /health
pub async fn health() -> Json<ApiResponse<serde_json::Value>> {
    let start = Instant::now();
    let data = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    Json(ApiResponse::success(
        data,
        Uuid::now_v7().to_string(),
        start.elapsed().as_millis() as u64,
    ))
}

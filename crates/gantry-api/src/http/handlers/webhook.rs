//! Webhook receiver handler.
//!
//! Normalizes the incoming webhook into an `InboundEvent`, runs one
//! orchestrator invocation to completion on a detached task, and answers
//! with the dispatch report:
//! - 400 when the event type header is missing or the payload is unusable
//! - 500 when the repository snapshot fails
//! - 200 otherwise, whether or not any build was triggered

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::Instrument;
use uuid::Uuid;

use gantry_core::event::{EVENT_TYPE_HEADERS, normalize_webhook};
use gantry_core::port::executor::BuildExecutor;
use gantry_core::port::snapshot::SnapshotProvider;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// First non-empty event type header, in `EVENT_TYPE_HEADERS` order.
pub fn event_type_from_headers(headers: &HeaderMap) -> Option<&str> {
    EVENT_TYPE_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    })
}

/// POST /webhook - Receive a repository webhook.
pub async fn receive_webhook<S, E>(
    State(state): State<AppState<S, E>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError>
where
    S: SnapshotProvider + 'static,
    E: BuildExecutor + 'static,
{
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let event = normalize_webhook(event_type_from_headers(&headers), &body)?;

    tracing::info!(
        request_id = %request_id,
        event_type = %event.event_type,
        repository = %event.repository.name,
        commit_id = %event.commit_id,
        "webhook received"
    );

    // Run the invocation on its own task so a caller that hangs up (forges
    // stop waiting after a few seconds) does not cancel it.
    let orchestrator = Arc::clone(&state.orchestrator);
    let shutdown = state.shutdown.clone();
    let invocation = async move { orchestrator.handle_with_cancel(&event, &shutdown).await };
    let report = tokio::spawn(invocation.instrument(tracing::Span::current()))
        .await
        .map_err(|e| AppError::Internal(format!("dispatch invocation failed: {e}")))??;

    let data = serde_json::json!({
        "message": report.summary_message(),
        "report": serde_json::to_value(&report)
            .map_err(|e| AppError::Internal(format!("failed to serialize report: {e}")))?,
    });

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}

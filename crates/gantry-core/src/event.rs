//! Webhook payload normalization.
//!
//! Turns a raw webhook (event-type header value + JSON body) into an
//! `InboundEvent`. Push payloads carry `ref` and `after` at the top level;
//! pull-request payloads carry them under `pull_request.head`.

use serde_json::Value;

use gantry_types::error::EventError;
use gantry_types::event::{InboundEvent, RepositoryInfo};

/// Headers that name the originating event category, in lookup order.
pub const EVENT_TYPE_HEADERS: &[&str] = &["x-github-event", "x-gitea-event", "x-gogs-event"];

const BRANCH_PREFIX: &str = "refs/heads/";

/// Strip a leading `refs/heads/` from a ref. Other refs are returned as-is.
pub fn strip_branch_prefix(git_ref: &str) -> &str {
    git_ref.strip_prefix(BRANCH_PREFIX).unwrap_or(git_ref)
}

/// Build a validated `InboundEvent` from a webhook.
///
/// Fails with `MissingEventType` when no header value was supplied,
/// `MalformedPayload` when the body is not JSON, and `MissingField` when the
/// normalized event is incomplete.
pub fn normalize_webhook(event_type: Option<&str>, body: &[u8]) -> Result<InboundEvent, EventError> {
    let event_type = event_type
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(EventError::MissingEventType)?;

    let payload: Value =
        serde_json::from_slice(body).map_err(|e| EventError::MalformedPayload(e.to_string()))?;

    let event = InboundEvent::new(
        event_type,
        RepositoryInfo {
            name: string_at(&payload, "/repository/name"),
            clone_url: string_at(&payload, "/repository/clone_url"),
        },
        strip_branch_prefix(&first_string(&payload, &["/ref", "/pull_request/head/ref"])),
        first_string(&payload, &["/after", "/pull_request/head/sha"]),
    );
    event.validate()?;
    Ok(event)
}

fn string_at(payload: &Value, pointer: &str) -> String {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn first_string(payload: &Value, pointers: &[&str]) -> String {
    pointers
        .iter()
        .map(|p| string_at(payload, p))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

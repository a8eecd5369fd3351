//! Build dispatcher: one bounded executor call per matched definition.
//!
//! `BuildDispatcher` wraps a `BuildExecutor`, applies the dispatch timeout,
//! and folds every possible result into a `DispatchOutcome`. It never
//! retries: the executor is not guaranteed to be idempotent against
//! duplicate triggers.

use std::time::Duration;

use gantry_types::workflow::{DispatchOutcome, DispatchRequest};

use crate::port::executor::{BuildExecutor, ExecutorResponse};

/// The only status code the executor uses to signal an accepted trigger.
pub const ACCEPTED_STATUS: u16 = 201;

/// Longest executor response body quoted in a failure reason.
const MAX_REASON_BODY_CHARS: usize = 512;

pub struct BuildDispatcher<E: BuildExecutor> {
    executor: E,
    timeout: Duration,
}

impl<E: BuildExecutor> BuildDispatcher<E> {
    pub fn new(executor: E, timeout: Duration) -> Self {
        Self { executor, timeout }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Send `request` to the executor and classify the result.
    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchOutcome {
        let outcome = match tokio::time::timeout(self.timeout, self.executor.trigger(request)).await {
            Ok(Ok(response)) => classify_response(&response),
            Ok(Err(err)) => DispatchOutcome::DispatchFailed(err.to_string()),
            Err(_) => {
                DispatchOutcome::DispatchFailed(format!("timed out after {:?}", self.timeout))
            }
        };

        match &outcome {
            DispatchOutcome::Triggered => tracing::info!(
                repo = %request.repo_name,
                branch = %request.branch,
                commit_id = %request.commit_id,
                "build triggered"
            ),
            DispatchOutcome::DispatchFailed(reason) => tracing::error!(
                repo = %request.repo_name,
                commit_id = %request.commit_id,
                reason = %reason,
                "failed to trigger build"
            ),
            DispatchOutcome::NotTriggered => {}
        }
        outcome
    }
}

/// Map an executor response to an outcome: `201` is success, anything else
/// is a failure quoting the status and (truncated) body.
pub fn classify_response(response: &ExecutorResponse) -> DispatchOutcome {
    if response.status == ACCEPTED_STATUS {
        return DispatchOutcome::Triggered;
    }
    let body = response.body.trim();
    let body: String = if body.chars().count() > MAX_REASON_BODY_CHARS {
        let mut cut: String = body.chars().take(MAX_REASON_BODY_CHARS).collect();
        cut.push_str("...");
        cut
    } else {
        body.to_string()
    };
    DispatchOutcome::DispatchFailed(format!("{}: {}", response.status, body))
}

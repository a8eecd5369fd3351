//! `gantry dispatch` -- one-shot processing of a webhook payload.
//!
//! Runs the same pipeline as `POST /webhook` once and prints the dispatch
//! report as JSON on stdout. Exit codes: 0 when the pipeline ran (whether or
//! not anything was triggered), 2 for an invalid event, 1 for faults.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;

use gantry_core::event::normalize_webhook;
use gantry_core::orchestrator::{Orchestrator, OrchestratorError};
use gantry_core::port::executor::BuildExecutor;
use gantry_core::port::snapshot::SnapshotProvider;
use gantry_types::event::InboundEvent;

/// Exit code for a webhook that could not be turned into a valid event.
pub const EXIT_INVALID_EVENT: u8 = 2;

/// Read a payload file and normalize it into an event.
pub async fn read_event(event_type: &str, payload: &Path) -> anyhow::Result<Result<InboundEvent, String>> {
    let body = tokio::fs::read(payload)
        .await
        .with_context(|| format!("Failed to read payload {}", payload.display()))?;
    Ok(normalize_webhook(Some(event_type), &body).map_err(|e| e.to_string()))
}

/// Run one invocation and print its report.
pub async fn run<S, E>(
    orchestrator: &Orchestrator<S, E>,
    event_type: &str,
    payload: &Path,
) -> anyhow::Result<ExitCode>
where
    S: SnapshotProvider,
    E: BuildExecutor + 'static,
{
    let event = match read_event(event_type, payload).await? {
        Ok(event) => event,
        Err(message) => {
            eprintln!("invalid event: {message}");
            return Ok(ExitCode::from(EXIT_INVALID_EVENT));
        }
    };

    match orchestrator.handle(&event).await {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            eprintln!("{}", report.summary_message());
            Ok(ExitCode::SUCCESS)
        }
        Err(OrchestratorError::InvalidEvent(e)) => {
            eprintln!("invalid event: {e}");
            Ok(ExitCode::from(EXIT_INVALID_EVENT))
        }
        Err(e @ OrchestratorError::Snapshot(_)) => Err(e.into()),
    }
}

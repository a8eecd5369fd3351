//! Dispatch orchestration for one inbound event.
//!
//! `Orchestrator::handle` runs the whole pipeline:
//! validate -> snapshot -> load -> evaluate -> build -> dispatch -> aggregate.
//!
//! Validation, snapshot and loading are sequential. Dispatches for matched
//! definitions run concurrently on a `JoinSet`, bounded by a semaphore. The
//! report always lists every loaded definition in loader order, regardless
//! of completion order.
//!
//! Dropping the invocation future (a disconnected webhook caller, for one)
//! detaches the dispatch tasks instead of aborting them, so an executor call
//! that has been sent is never cut off halfway.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use gantry_types::config::{DefinitionsConfig, GantryConfig, TriggerMode};
use gantry_types::error::{EventError, SnapshotError};
use gantry_types::event::InboundEvent;
use gantry_types::workflow::{DispatchEntry, DispatchOutcome, DispatchReport};

use crate::dispatch::dispatcher::BuildDispatcher;
use crate::dispatch::payload::build_request;
use crate::port::executor::BuildExecutor;
use crate::port::snapshot::SnapshotProvider;
use crate::workflow::loader::DefinitionLoader;
use crate::workflow::trigger::TriggerEvaluator;

/// Dispatch tasks of one invocation. Dropped tasks are detached, not aborted.
struct DispatchTasks(JoinSet<DispatchOutcome>);

impl Drop for DispatchTasks {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            tracing::warn!(
                pending = self.0.len(),
                "invocation dropped before dispatches finished; detaching them"
            );
        }
        self.0.detach_all();
    }
}

/// Failures that abort an invocation. Everything else ends up in the report.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] EventError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Tunables the orchestrator needs, derived from `GantryConfig`.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub snapshot_timeout: Duration,
    pub dispatch_timeout: Duration,
    /// Maximum in-flight executor calls. Values below 1 are treated as 1.
    pub concurrency: usize,
    pub trigger_mode: TriggerMode,
    pub definitions: DefinitionsConfig,
}

impl OrchestratorSettings {
    pub fn from_config(config: &GantryConfig) -> Self {
        Self {
            snapshot_timeout: Duration::from_secs(config.snapshot.timeout_secs),
            dispatch_timeout: Duration::from_secs(config.executor.timeout_secs),
            concurrency: config.dispatch.concurrency,
            trigger_mode: config.dispatch.trigger_mode,
            definitions: config.definitions.clone(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&GantryConfig::default())
    }
}

pub struct Orchestrator<S: SnapshotProvider, E: BuildExecutor + 'static> {
    snapshots: S,
    dispatcher: Arc<BuildDispatcher<E>>,
    loader: DefinitionLoader,
    evaluator: TriggerEvaluator,
    snapshot_timeout: Duration,
    concurrency: usize,
}

impl<S: SnapshotProvider, E: BuildExecutor + 'static> Orchestrator<S, E> {
    pub fn new(snapshots: S, executor: E, settings: OrchestratorSettings) -> Self {
        Self {
            snapshots,
            dispatcher: Arc::new(BuildDispatcher::new(executor, settings.dispatch_timeout)),
            loader: DefinitionLoader::new(settings.definitions),
            evaluator: TriggerEvaluator::new(settings.trigger_mode),
            snapshot_timeout: settings.snapshot_timeout,
            concurrency: settings.concurrency.max(1),
        }
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    pub fn executor(&self) -> &E {
        self.dispatcher.executor()
    }

    /// Process one event to completion.
    pub async fn handle(&self, event: &InboundEvent) -> Result<DispatchReport, OrchestratorError> {
        self.handle_with_cancel(event, &CancellationToken::new()).await
    }

    /// Process one event; definitions whose dispatch has not started when
    /// `cancel` fires are reported as `NotTriggered`. In-flight executor calls
    /// run to completion.
    pub async fn handle_with_cancel(
        &self,
        event: &InboundEvent,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, OrchestratorError> {
        event.validate()?;

        let span = tracing::info_span!(
            "dispatch_invocation",
            event_type = %event.event_type,
            repository = %event.repository.name,
            commit_id = %event.commit_id,
        );
        self.run(event, cancel).instrument(span).await
    }

    async fn run(
        &self,
        event: &InboundEvent,
        cancel: &CancellationToken,
    ) -> Result<DispatchReport, OrchestratorError> {
        let started_at = Utc::now();

        let snapshot = tokio::time::timeout(
            self.snapshot_timeout,
            self.snapshots.fetch(&event.repository.clone_url, &event.commit_id),
        )
        .await
        .map_err(|_| SnapshotError::Timeout(self.snapshot_timeout.as_secs()))??;

        let loaded = self
            .loader
            .load(snapshot.as_ref())
            .map_err(SnapshotError::from)?;
        drop(snapshot);

        let mut outcomes = vec![DispatchOutcome::NotTriggered; loaded.definitions.len()];
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = DispatchTasks(JoinSet::new());
        let mut task_index = HashMap::new();

        for (index, definition) in loaded.definitions.iter().enumerate() {
            if !self.evaluator.matches(event, definition.trigger.as_ref()) {
                tracing::debug!(source_file = %definition.source_file, "trigger did not match");
                continue;
            }
            if cancel.is_cancelled() {
                continue;
            }

            let request = build_request(definition, event);
            let dispatcher = Arc::clone(&self.dispatcher);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let handle = tasks.0.spawn(async move {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    permit = semaphore.acquire_owned() => permit.ok(),
                };
                let Some(_permit) = permit else {
                    return DispatchOutcome::NotTriggered;
                };
                if cancel.is_cancelled() {
                    return DispatchOutcome::NotTriggered;
                }
                dispatcher.dispatch(&request).await
            });
            task_index.insert(handle.id(), index);
        }

        while let Some(joined) = tasks.0.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(err) => {
                    tracing::error!(error = %err, "dispatch task failed");
                    (err.id(), DispatchOutcome::DispatchFailed(format!("dispatch task failed: {err}")))
                }
            };
            if let Some(&index) = task_index.get(&id) {
                outcomes[index] = outcome;
            }
        }

        let entries: Vec<DispatchEntry> = loaded
            .definitions
            .iter()
            .zip(outcomes)
            .map(|(definition, outcome)| DispatchEntry {
                source_file: definition.source_file.clone(),
                outcome,
            })
            .collect();

        let report = DispatchReport {
            invocation_id: Uuid::now_v7(),
            event_type: event.event_type.clone(),
            repository: event.repository.name.clone(),
            commit_id: event.commit_id.clone(),
            started_at,
            completed_at: Utc::now(),
            entries,
            diagnostics: loaded.diagnostics,
        };

        tracing::info!(
            definitions = report.entries.len(),
            triggered = report.triggered_count(),
            failed = report.failed_count(),
            skipped = report.diagnostics.len(),
            "dispatch invocation complete"
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

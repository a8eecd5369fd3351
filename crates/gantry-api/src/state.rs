//! Application state wiring the orchestrator to its adapters.
//!
//! The orchestrator is generic over its snapshot provider and build
//! executor. `AppState` defaults those to the concrete infra implementations;
//! tests substitute in-process fakes.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gantry_core::orchestrator::{Orchestrator, OrchestratorSettings};
use gantry_core::port::executor::BuildExecutor;
use gantry_core::port::snapshot::SnapshotProvider;
use gantry_infra::executor::JenkinsExecutor;
use gantry_infra::snapshot::GitSnapshotProvider;
use gantry_types::config::GantryConfig;

/// Orchestrator pinned to the git snapshot provider and Jenkins executor.
pub type ConcreteOrchestrator = Orchestrator<GitSnapshotProvider, JenkinsExecutor>;

/// Build the production orchestrator from config.
pub fn build_orchestrator(config: &GantryConfig) -> anyhow::Result<ConcreteOrchestrator> {
    let executor = JenkinsExecutor::from_config(&config.executor)?;
    let snapshots = GitSnapshotProvider::from_config(&config.snapshot);
    Ok(Orchestrator::new(
        snapshots,
        executor,
        OrchestratorSettings::from_config(config),
    ))
}

/// Shared state for HTTP handlers.
pub struct AppState<S = GitSnapshotProvider, E = JenkinsExecutor>
where
    S: SnapshotProvider,
    E: BuildExecutor + 'static,
{
    pub orchestrator: Arc<Orchestrator<S, E>>,
    /// Fired on server shutdown; dispatches not yet started are skipped.
    pub shutdown: CancellationToken,
}

impl<S: SnapshotProvider, E: BuildExecutor + 'static> AppState<S, E> {
    pub fn new(orchestrator: Orchestrator<S, E>, shutdown: CancellationToken) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            shutdown,
        }
    }
}

impl<S: SnapshotProvider, E: BuildExecutor + 'static> Clone for AppState<S, E> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            shutdown: self.shutdown.clone(),
        }
    }
}

//! Infrastructure implementations for Gantry.
//!
//! Concrete adapters for the ports defined in `gantry-core`:
//! - `snapshot::GitSnapshotProvider` materializes repositories with the `git` CLI
//! - `executor::JenkinsExecutor` triggers parameterized Jenkins builds
//!
//! plus process configuration loading (`config::load_config`).

pub mod config;
pub mod executor;
pub mod snapshot;

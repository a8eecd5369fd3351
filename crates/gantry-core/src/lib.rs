//! Trigger evaluation and dispatch orchestration for Gantry.
//!
//! This crate defines the "ports" (`SnapshotProvider`, `BuildExecutor`) that
//! the infrastructure layer implements, and all of the decision logic that
//! sits between them. It depends only on `gantry-types` -- never on
//! `gantry-infra`, git, or any HTTP client.

pub mod dispatch;
pub mod event;
pub mod orchestrator;
pub mod port;
pub mod workflow;

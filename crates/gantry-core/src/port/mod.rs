//! Port trait definitions.
//!
//! These traits define the collaborator interfaces that the infrastructure
//! layer (gantry-infra) implements. The core crate never depends on a
//! specific VCS or build system.

pub mod executor;
pub mod snapshot;

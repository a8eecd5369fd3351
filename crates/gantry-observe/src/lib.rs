//! Observability setup for Gantry binaries.

pub mod tracing_setup;

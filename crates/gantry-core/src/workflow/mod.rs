//! Workflow definitions: discovery/parsing (`loader`) and trigger
//! evaluation (`trigger`).

pub mod loader;
pub mod trigger;

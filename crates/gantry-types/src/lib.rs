//! Shared domain types for Gantry.
//!
//! This crate contains the core domain types used across the Gantry
//! workspace: inbound webhook events, workflow definitions and their trigger
//! specs, dispatch requests/outcomes/reports, configuration, and the error
//! taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, secrecy.

pub mod config;
pub mod error;
pub mod event;
pub mod workflow;

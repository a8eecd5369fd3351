//! CLI command definitions for the `gantry` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod check;
pub mod dispatch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Turn repository webhooks into build executor triggers.
#[derive(Parser)]
#[command(name = "gantry", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file (default: ./gantry.toml if present).
    #[arg(short, long, global = true, env = "GANTRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook HTTP server.
    Serve {
        /// Address to bind (overrides [server].host).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides [server].port).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process a single webhook payload and print the dispatch report.
    Dispatch {
        /// Event type, as the X-GitHub-Event header would carry it.
        #[arg(short, long)]
        event: String,

        /// File holding the JSON webhook body.
        #[arg(short, long)]
        payload: PathBuf,
    },

    /// Validate the workflow definitions of a local checkout.
    Check {
        /// Repository root containing the definitions directory.
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Also report whether each definition fires for this event type.
        #[arg(short, long)]
        event: Option<String>,

        /// Branch used for branch-filter evaluation.
        #[arg(short, long, default_value = "main")]
        branch: String,
    },
}

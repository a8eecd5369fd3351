//! Gantry CLI and webhook server entry point.
//!
//! Binary name: `gantry`
//!
//! Parses CLI arguments, loads configuration, then runs the requested
//! command or starts the webhook HTTP server.

mod cli;
mod http;
mod state;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use gantry_infra::config::load_config;
use gantry_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use gantry_types::config::GantryConfig;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(verbosity_filter(cli.verbose), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => {
            serve(&config, host, port).await?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Dispatch { event, payload } => {
            let orchestrator = state::build_orchestrator(&config)?;
            cli::dispatch::run(&orchestrator, &event, &payload).await
        }

        Commands::Check { dir, event, branch } => {
            cli::check::run(&config, &dir, event.as_deref(), &branch, cli.json)
        }
    }
}

async fn serve(config: &GantryConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let orchestrator = state::build_orchestrator(config)?;
    let shutdown = CancellationToken::new();
    let state = AppState::new(orchestrator, shutdown.clone());

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(addr = %addr, "gantry webhook server listening");

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            shutdown.cancel();
        })
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

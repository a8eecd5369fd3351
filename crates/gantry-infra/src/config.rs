//! Process configuration loader for Gantry.
//!
//! Reads `gantry.toml` (or the file passed with `--config`), applies
//! environment overrides, and validates the result. The config is built once
//! at startup and handed to the orchestrator and adapters by value.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use gantry_types::config::GantryConfig;
use gantry_types::error::ConfigError;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "gantry.toml";

/// Environment variables that override file values.
pub const ENV_EXECUTOR_URL: &str = "JENKINS_URL";
pub const ENV_EXECUTOR_USERNAME: &str = "JENKINS_USERNAME";
pub const ENV_EXECUTOR_TOKEN: &str = "JENKINS_API_TOKEN";
pub const ENV_SCM_TOKEN: &str = "GITHUB_TOKEN";

/// Load configuration using the process environment for overrides.
///
/// - `path = None` and no `gantry.toml` in the working directory: defaults.
/// - An explicit `path` that does not exist: `ConfigError::Read`.
/// - A file that fails to parse: `ConfigError::Parse` (no silent fallback).
pub async fn load_config(path: Option<&Path>) -> Result<GantryConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok()).await
}

/// Same as [`load_config`] with an injectable environment lookup.
pub async fn load_config_with_env<F>(path: Option<&Path>, env: F) -> Result<GantryConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (config_path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => toml::from_str::<GantryConfig>(&content).map_err(|e| ConfigError::Parse {
            path: config_path.display().to_string(),
            message: e.to_string(),
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            tracing::debug!("No {} found, using defaults", config_path.display());
            GantryConfig::default()
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    apply_env_overrides(&mut config, env);
    validate(&config)?;
    Ok(config)
}

/// Overlay non-empty environment values onto `config`.
pub fn apply_env_overrides<F>(config: &mut GantryConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = lookup(ENV_EXECUTOR_URL) {
        config.executor.url = Some(url);
    }
    if let Some(username) = lookup(ENV_EXECUTOR_USERNAME) {
        config.executor.username = username;
    }
    if let Some(token) = lookup(ENV_EXECUTOR_TOKEN) {
        config.executor.api_token = Some(SecretString::from(token));
    }
    if let Some(token) = lookup(ENV_SCM_TOKEN) {
        config.snapshot.access_token = Some(SecretString::from(token));
    }
}

/// Reject values the runtime cannot work with.
///
/// The executor URL is checked separately by `JenkinsExecutor::from_config`,
/// since commands that never dispatch do not need one.
pub fn validate(config: &GantryConfig) -> Result<(), ConfigError> {
    if config.dispatch.concurrency == 0 {
        return Err(ConfigError::Invalid(
            "dispatch.concurrency must be at least 1".to_string(),
        ));
    }
    if config.executor.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "executor.timeout_secs must be greater than 0".to_string(),
        ));
    }
    if config.snapshot.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "snapshot.timeout_secs must be greater than 0".to_string(),
        ));
    }
    if config.definitions.directory.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "definitions.directory must not be empty".to_string(),
        ));
    }
    if config.definitions.extensions.is_empty() {
        return Err(ConfigError::Invalid(
            "definitions.extensions must list at least one extension".to_string(),
        ));
    }
    Ok(())
}

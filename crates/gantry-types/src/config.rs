//! Process configuration types for Gantry.
//!
//! `GantryConfig` represents the top-level `gantry.toml`. It is built once at
//! process start (file + environment overrides, see
//! `gantry_infra::config::load_config`) and never mutated afterwards.

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct GantryConfig {
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub definitions: DefinitionsConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

// ---------------------------------------------------------------------------
// Build executor
// ---------------------------------------------------------------------------

/// Connection settings for the external build executor.
#[derive(Debug, Deserialize)]
pub struct ExecutorConfig {
    /// Base URL (e.g. "https://jenkins.example.com"). Required at startup.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub api_token: Option<SecretString>,
    /// Job that receives `buildWithParameters` calls.
    #[serde(default = "default_job")]
    pub job: String,
    #[serde(default = "default_executor_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_job() -> String {
    "shared-library".to_string()
}

fn default_executor_timeout_secs() -> u64 {
    30
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            url: None,
            username: String::new(),
            api_token: None,
            job: default_job(),
            timeout_secs: default_executor_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot provider
// ---------------------------------------------------------------------------

/// Settings for the git-backed snapshot provider.
#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_git_binary")]
    pub git_binary: String,
    #[serde(default = "default_snapshot_timeout_secs")]
    pub timeout_secs: u64,
    /// Fetch only the requested revision instead of the full history.
    #[serde(default)]
    pub shallow: bool,
    /// Token injected into `https://github.com/...` clone URLs.
    #[serde(default, deserialize_with = "deserialize_secret")]
    pub access_token: Option<SecretString>,
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_snapshot_timeout_secs() -> u64 {
    120
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            timeout_secs: default_snapshot_timeout_secs(),
            shallow: false,
            access_token: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Where workflow definitions live inside a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionsConfig {
    #[serde(default = "default_definitions_dir")]
    pub directory: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_definitions_dir() -> String {
    ".workflow".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

impl Default for DefinitionsConfig {
    fn default() -> Self {
        Self {
            directory: default_definitions_dir(),
            extensions: default_extensions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// How `Detailed` trigger specs are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// Event type must be a key of the mapping; constraints are ignored.
    #[default]
    KeyMembership,
    /// Additionally honor `branches` / `branches-ignore` constraint lists.
    BranchFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum in-flight executor calls per invocation.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub trigger_mode: TriggerMode,
}

fn default_concurrency() -> usize {
    4
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            trigger_mode: TriggerMode::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()).map(SecretString::from))
}

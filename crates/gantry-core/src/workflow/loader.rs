//! Workflow definition discovery and parsing.
//!
//! Scans the definitions directory of a snapshot (non-recursively), parses
//! each YAML document into a `WorkflowDefinition`, and records a diagnostic
//! for every file that cannot be used. A bad file never prevents the others
//! from loading.

use std::path::Path;

use serde_json::Value;

use gantry_types::config::DefinitionsConfig;
use gantry_types::error::DefinitionError;
use gantry_types::workflow::{DefinitionDiagnostic, WorkflowDefinition};

/// Result of scanning one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDefinitions {
    /// Parsed definitions, sorted by file name.
    pub definitions: Vec<WorkflowDefinition>,
    /// Files that were skipped, sorted by file name.
    pub diagnostics: Vec<DefinitionDiagnostic>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a single YAML document into a `WorkflowDefinition`.
///
/// The document must be a mapping. Its `on` key (if any) becomes the trigger;
/// the whole document is kept as the raw payload.
pub fn parse_definition(source_file: &str, yaml: &str) -> Result<WorkflowDefinition, DefinitionError> {
    let raw: Value = serde_yaml_ng::from_str(yaml).map_err(|e| DefinitionError::Parse {
        file: source_file.to_string(),
        message: e.to_string(),
    })?;
    if !raw.is_object() {
        return Err(DefinitionError::NotAMapping {
            file: source_file.to_string(),
        });
    }
    Ok(WorkflowDefinition::from_document(source_file, raw))
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

/// Loads workflow definitions from a repository snapshot.
#[derive(Debug, Clone)]
pub struct DefinitionLoader {
    config: DefinitionsConfig,
}

impl DefinitionLoader {
    pub fn new(config: DefinitionsConfig) -> Self {
        Self { config }
    }

    /// Directory name scanned under the snapshot root.
    pub fn directory(&self) -> &str {
        &self.config.directory
    }

    /// Load every definition directly under `<snapshot_root>/<directory>`.
    ///
    /// A missing directory yields an empty result. Only a failure to list an
    /// existing directory is returned as an error.
    pub fn load(&self, snapshot_root: &Path) -> std::io::Result<LoadedDefinitions> {
        let dir = snapshot_root.join(&self.config.directory);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "no workflow definitions directory");
            return Ok(LoadedDefinitions::default());
        }

        let mut candidates = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !self.has_definition_extension(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                candidates.push(name.to_string());
            }
        }
        candidates.sort();

        let mut loaded = LoadedDefinitions::default();
        for name in candidates {
            match self.load_file(&dir, &name) {
                Ok(def) => loaded.definitions.push(def),
                Err(err) => {
                    tracing::warn!(source_file = %name, error = %err, "skipping workflow definition");
                    loaded.diagnostics.push(DefinitionDiagnostic {
                        source_file: name,
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            loaded = loaded.definitions.len(),
            skipped = loaded.diagnostics.len(),
            "loaded workflow definitions"
        );
        Ok(loaded)
    }

    fn load_file(&self, dir: &Path, name: &str) -> Result<WorkflowDefinition, DefinitionError> {
        let content = std::fs::read_to_string(dir.join(name)).map_err(|e| DefinitionError::Read {
            file: name.to_string(),
            message: e.to_string(),
        })?;
        parse_definition(name, &content)
    }

    fn has_definition_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|known| known == ext))
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new(DefinitionsConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

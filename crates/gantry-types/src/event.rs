//! Normalized inbound webhook events.
//!
//! An `InboundEvent` is the only shape of input the orchestrator accepts. The
//! transport layer builds one from a raw webhook (see
//! `gantry_core::event::normalize_webhook`) and the orchestrator validates it
//! before any side effect happens.

use serde::{Deserialize, Serialize};

use crate::error::EventError;

/// Repository the event originated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Short repository name (e.g. "gantry").
    pub name: String,
    /// URL the snapshot provider clones from.
    pub clone_url: String,
}

/// A normalized version-control webhook notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Originating event category (e.g. "push", "pull_request").
    pub event_type: String,
    pub repository: RepositoryInfo,
    /// Branch name with any `refs/heads/` prefix already stripped.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Head commit after the event; the snapshot is pinned to it.
    pub commit_id: String,
}

impl InboundEvent {
    pub fn new(
        event_type: impl Into<String>,
        repository: RepositoryInfo,
        git_ref: impl Into<String>,
        commit_id: impl Into<String>,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            repository,
            git_ref: git_ref.into(),
            commit_id: commit_id.into(),
        }
    }

    /// Check that every required field is present and non-empty.
    ///
    /// Whitespace-only values count as empty.
    pub fn validate(&self) -> Result<(), EventError> {
        let fields: [(&'static str, &str); 5] = [
            ("event_type", &self.event_type),
            ("repository.name", &self.repository.name),
            ("repository.clone_url", &self.repository.clone_url),
            ("ref", &self.git_ref),
            ("commit_id", &self.commit_id),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(EventError::MissingField(name));
            }
        }
        Ok(())
    }
}

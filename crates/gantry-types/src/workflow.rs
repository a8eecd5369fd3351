//! Workflow definition and dispatch domain types.
//!
//! A `WorkflowDefinition` is parsed fresh from the repository snapshot on
//! every invocation. Only its trigger field is interpreted; the rest of the
//! document is forwarded verbatim to the build executor inside a
//! `DispatchRequest`. Per-definition results are collected into a
//! `DispatchReport`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// Trigger spec
// ---------------------------------------------------------------------------

/// The condition under which a workflow definition fires.
///
/// One variant per shape the `on` field may take. Anything that is not a
/// string, a list, or a mapping lands in `Unrecognized` and never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// `on: push`
    Single(String),
    /// `on: [push, pull_request]`
    Set(Vec<String>),
    /// `on: { push: { branches: [main] } }` -- event type to constraint payload.
    Detailed(Map<String, Value>),
    /// Any other shape (number, boolean, null).
    Unrecognized(Value),
}

impl TriggerSpec {
    /// Classify a raw `on` value.
    ///
    /// Non-string entries of a list are dropped: they can never equal an
    /// event type, so keeping them would not change any match result.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::String(s) => TriggerSpec::Single(s.clone()),
            Value::Array(items) => TriggerSpec::Set(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::Object(map) => TriggerSpec::Detailed(map.clone()),
            other => TriggerSpec::Unrecognized(other.clone()),
        }
    }
}

impl fmt::Display for TriggerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerSpec::Single(event) => write!(f, "{event}"),
            TriggerSpec::Set(events) => write!(f, "[{}]", events.join(", ")),
            TriggerSpec::Detailed(map) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                write!(f, "{{{}}}", keys.join(", "))
            }
            TriggerSpec::Unrecognized(value) => write!(f, "<unrecognized: {value}>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Workflow definition
// ---------------------------------------------------------------------------

/// Top-level document key holding the trigger spec.
pub const TRIGGER_KEY: &str = "on";

/// One parsed workflow definition document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowDefinition {
    /// Path relative to the definitions directory (e.g. "build.yaml").
    pub source_file: String,
    /// `None` when the document has no `on` key.
    pub trigger: Option<TriggerSpec>,
    /// The complete document, forwarded untouched.
    pub raw: Value,
}

impl WorkflowDefinition {
    /// Build a definition from an already-parsed document.
    pub fn from_document(source_file: impl Into<String>, raw: Value) -> Self {
        let trigger = raw.get(TRIGGER_KEY).map(TriggerSpec::from_value);
        Self {
            source_file: source_file.into(),
            trigger,
            raw,
        }
    }
}

/// A definition file that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionDiagnostic {
    pub source_file: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Dispatch request / outcome
// ---------------------------------------------------------------------------

/// Payload sent to the build executor for one matched definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchRequest {
    /// The raw definition document.
    pub workflow_metadata: Value,
    pub repo_name: String,
    pub repo_url: String,
    pub branch: String,
    pub commit_id: String,
}

impl DispatchRequest {
    /// Encode as the executor's form parameters.
    ///
    /// `workflow_metadata` travels as a JSON string.
    pub fn to_form_fields(&self) -> Result<Vec<(&'static str, String)>, DispatchError> {
        let metadata = serde_json::to_string(&self.workflow_metadata)
            .map_err(|e| DispatchError::Encoding(e.to_string()))?;
        Ok(vec![
            ("workflow_metadata", metadata),
            ("repo_name", self.repo_name.clone()),
            ("repo_url", self.repo_url.clone()),
            ("branch", self.branch.clone()),
            ("commit_id", self.commit_id.clone()),
        ])
    }
}

/// Result for a single definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Triggered,
    NotTriggered,
    DispatchFailed(String),
}

impl DispatchOutcome {
    pub fn is_triggered(&self) -> bool {
        matches!(self, DispatchOutcome::Triggered)
    }
}

impl fmt::Display for DispatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchOutcome::Triggered => write!(f, "triggered"),
            DispatchOutcome::NotTriggered => write!(f, "not triggered"),
            DispatchOutcome::DispatchFailed(reason) => write!(f, "dispatch failed: {reason}"),
        }
    }
}

/// One row of a `DispatchReport`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchEntry {
    pub source_file: String,
    pub outcome: DispatchOutcome,
}

// ---------------------------------------------------------------------------
// Dispatch report
// ---------------------------------------------------------------------------

/// Aggregate result of one orchestrator invocation.
///
/// Entries are in loader order, one per loaded definition. Files the loader
/// skipped appear under `diagnostics` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    pub invocation_id: Uuid,
    pub event_type: String,
    pub repository: String,
    pub commit_id: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub entries: Vec<DispatchEntry>,
    pub diagnostics: Vec<DefinitionDiagnostic>,
}

impl DispatchReport {
    /// True iff at least one entry is `Triggered`.
    pub fn any_triggered(&self) -> bool {
        self.entries.iter().any(|e| e.outcome.is_triggered())
    }

    pub fn triggered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_triggered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, DispatchOutcome::DispatchFailed(_)))
            .count()
    }

    /// Human-readable summary used by the transport layer.
    pub fn summary_message(&self) -> &'static str {
        if self.any_triggered() {
            "Build triggered successfully"
        } else {
            "No builds were triggered"
        }
    }
}

impl Serialize for DispatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DispatchReport", 9)?;
        s.serialize_field("invocation_id", &self.invocation_id)?;
        s.serialize_field("event_type", &self.event_type)?;
        s.serialize_field("repository", &self.repository)?;
        s.serialize_field("commit_id", &self.commit_id)?;
        s.serialize_field("started_at", &self.started_at)?;
        s.serialize_field("completed_at", &self.completed_at)?;
        s.serialize_field("any_triggered", &self.any_triggered())?;
        s.serialize_field("entries", &self.entries)?;
        s.serialize_field("diagnostics", &self.diagnostics)?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

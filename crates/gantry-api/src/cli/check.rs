//! `gantry check` -- validate workflow definitions in a local checkout.
//!
//! Loads definitions exactly as a webhook invocation would and lists each
//! file with its trigger. With `--event`, also shows whether the definition
//! would fire. Nothing is dispatched. Exits 1 when any file was skipped.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use serde::Serialize;

use gantry_core::workflow::loader::DefinitionLoader;
use gantry_core::workflow::trigger::TriggerEvaluator;
use gantry_types::config::GantryConfig;
use gantry_types::event::{InboundEvent, RepositoryInfo};
use gantry_types::workflow::DefinitionDiagnostic;

#[derive(Debug, Serialize)]
pub struct CheckedDefinition {
    pub source_file: String,
    /// Display form of the trigger, `None` when the file has no `on` key.
    pub trigger: Option<String>,
    /// Whether the definition fires for the requested event, if one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fires: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub directory: String,
    pub definitions: Vec<CheckedDefinition>,
    pub diagnostics: Vec<DefinitionDiagnostic>,
}

/// Load and evaluate the definitions under `dir`.
pub fn check_definitions(
    config: &GantryConfig,
    dir: &Path,
    event: Option<&InboundEvent>,
) -> anyhow::Result<CheckReport> {
    let loader = DefinitionLoader::new(config.definitions.clone());
    let evaluator = TriggerEvaluator::new(config.dispatch.trigger_mode);
    let loaded = loader
        .load(dir)
        .with_context(|| format!("Failed to read definitions under {}", dir.display()))?;

    let definitions = loaded
        .definitions
        .iter()
        .map(|def| CheckedDefinition {
            source_file: def.source_file.clone(),
            trigger: def.trigger.as_ref().map(ToString::to_string),
            fires: event.map(|ev| evaluator.matches(ev, def.trigger.as_ref())),
        })
        .collect();

    Ok(CheckReport {
        directory: dir.join(loader.directory()).display().to_string(),
        definitions,
        diagnostics: loaded.diagnostics,
    })
}

/// Event used to evaluate triggers locally.
pub fn local_event(dir: &Path, event_type: &str, branch: &str) -> InboundEvent {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("local")
        .to_string();
    InboundEvent::new(
        event_type,
        RepositoryInfo {
            name,
            clone_url: dir.display().to_string(),
        },
        branch,
        "HEAD",
    )
}

pub fn run(
    config: &GantryConfig,
    dir: &Path,
    event_type: Option<&str>,
    branch: &str,
    json: bool,
) -> anyhow::Result<ExitCode> {
    let event = event_type.map(|t| local_event(dir, t, branch));
    let report = check_definitions(config, dir, event.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, event_type);
    }

    Ok(if report.diagnostics.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &CheckReport, event_type: Option<&str>) {
    println!();
    println!("  Definitions in {}", report.directory);
    println!();
    if report.definitions.is_empty() && report.diagnostics.is_empty() {
        println!("  (none)");
    }
    for def in &report.definitions {
        let trigger = def.trigger.as_deref().unwrap_or("<no trigger>");
        match (def.fires, event_type) {
            (Some(fires), Some(event)) => {
                let verdict = if fires { "fires" } else { "skips" };
                println!("  ok    {:<32} on: {trigger}  [{event}: {verdict}]", def.source_file);
            }
            _ => println!("  ok    {:<32} on: {trigger}", def.source_file),
        }
    }
    for diag in &report.diagnostics {
        println!("  error {:<32} {}", diag.source_file, diag.message);
    }
    println!();
}

//! Dispatch payload construction.

use gantry_types::event::InboundEvent;
use gantry_types::workflow::{DispatchRequest, WorkflowDefinition};

/// Assemble the build request for a matched definition. Pure.
pub fn build_request(definition: &WorkflowDefinition, event: &InboundEvent) -> DispatchRequest {
    DispatchRequest {
        workflow_metadata: definition.raw.clone(),
        repo_name: event.repository.name.clone(),
        repo_url: event.repository.clone_url.clone(),
        branch: event.git_ref.clone(),
        commit_id: event.commit_id.clone(),
    }
}

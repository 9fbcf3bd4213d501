//! Workflow response types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use weave_runtime::workflow::Workflow;

/// A single workflow document.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEnvelope {
    /// The workflow.
    pub workflow: Workflow,
}

impl From<Workflow> for WorkflowEnvelope {
    fn from(workflow: Workflow) -> Self {
        Self { workflow }
    }
}

/// All workflows owned by the caller, most recently updated first.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workflows {
    /// The workflows.
    pub workflows: Vec<Workflow>,
}

/// Outcome of a delete operation.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    /// Always `true`; missing workflows are reported as 404.
    pub success: bool,
}

//! Workflow request types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;
use weave_runtime::graph::{Edge, Graph, Node};

use crate::service::WorkflowUpdate;

/// Request payload for creating a workflow.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkflow {
    /// Display name; blank names fall back to the default.
    #[validate(length(max = 200, message = "Workflow name cannot exceed 200 characters"))]
    pub name: Option<String>,
    /// Initial graph nodes.
    pub nodes: Option<Vec<Node>>,
    /// Initial graph edges.
    pub edges: Option<Vec<Edge>>,
}

impl CreateWorkflow {
    /// Splits the request into the optional name and the initial graph.
    pub fn into_parts(self) -> (Option<String>, Graph) {
        let graph = Graph::new(
            self.nodes.unwrap_or_default(),
            self.edges.unwrap_or_default(),
        );
        (self.name, graph)
    }
}

/// Request payload for updating a workflow. Absent fields are left unchanged.
#[must_use]
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkflow {
    /// New display name.
    #[validate(length(max = 200, message = "Workflow name cannot exceed 200 characters"))]
    pub name: Option<String>,
    /// Replacement nodes.
    pub nodes: Option<Vec<Node>>,
    /// Replacement edges.
    pub edges: Option<Vec<Edge>>,
}

impl From<UpdateWorkflow> for WorkflowUpdate {
    fn from(request: UpdateWorkflow) -> Self {
        Self {
            name: request.name,
            nodes: request.nodes,
            edges: request.edges,
        }
    }
}

//! Collaborators the editor session persists through.

use crate::WorkflowResult;
use crate::graph::Graph;
use crate::workflow::{Workflow, WorkflowId};

/// Document persistence for the open workflow.
#[async_trait::async_trait]
pub trait WorkflowStorage: Send + Sync {
    /// Loads a workflow by id.
    async fn load(&self, id: WorkflowId) -> WorkflowResult<Workflow>;

    /// Stores the name and sanitized graph of a workflow.
    async fn save(&self, id: WorkflowId, name: &str, graph: Graph) -> WorkflowResult<()>;
}

/// Object storage for images attached in the editor.
#[async_trait::async_trait]
pub trait ImageUploader: Send + Sync {
    /// Uploads an inline `data:` URL and returns its durable reference.
    async fn upload(&self, inline: &str) -> WorkflowResult<String>;
}

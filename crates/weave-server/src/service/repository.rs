//! Workflow document persistence scoped by owner.
//!
//! Every operation takes the owner identity. A document that belongs to
//! another owner is indistinguishable from one that does not exist.

use std::fmt;

use opendal::{EntryMode, ErrorKind, Operator};
use uuid::Uuid;
use weave_runtime::graph::{Edge, Graph, Node};
use weave_runtime::sanitize::sanitize;
use weave_runtime::workflow::{DEFAULT_WORKFLOW_NAME, Workflow, WorkflowId};

use crate::service::{Result, ServiceError};

/// Tracing target for document persistence.
pub const TRACING_TARGET: &str = "weave_server::service::workflows";

const WORKFLOWS_DIR: &str = "workflows";

/// Partial update of a workflow document.
#[derive(Debug, Clone, Default)]
pub struct WorkflowUpdate {
    /// New display name.
    pub name: Option<String>,
    /// Replacement node list.
    pub nodes: Option<Vec<Node>>,
    /// Replacement edge list.
    pub edges: Option<Vec<Edge>>,
}

/// Document persistence collaborator.
#[async_trait::async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Lists the owner's workflows, most recently updated first.
    async fn list(&self, owner: Uuid) -> Result<Vec<Workflow>>;

    /// Returns a workflow if it exists and belongs to the owner.
    async fn get(&self, id: WorkflowId, owner: Uuid) -> Result<Option<Workflow>>;

    /// Creates a workflow. A blank name falls back to the default name.
    async fn create(&self, owner: Uuid, name: Option<String>, graph: Graph) -> Result<Workflow>;

    /// Applies a partial update and returns the stored workflow.
    async fn update(
        &self,
        id: WorkflowId,
        owner: Uuid,
        update: WorkflowUpdate,
    ) -> Result<Option<Workflow>>;

    /// Deletes a workflow. Returns false if nothing was deleted.
    async fn delete(&self, id: WorkflowId, owner: Uuid) -> Result<bool>;
}

/// [`WorkflowRepository`] storing one JSON document per workflow.
///
/// Graphs pass through the persistence sanitizer on every write.
#[derive(Clone)]
pub struct DocumentStore {
    operator: Operator,
}

impl DocumentStore {
    /// Creates a store that writes through the given operator.
    pub fn new(operator: Operator) -> Self {
        Self { operator }
    }

    fn owner_dir(owner: Uuid) -> String {
        format!("{WORKFLOWS_DIR}/{owner}/")
    }

    fn document_path(id: WorkflowId, owner: Uuid) -> String {
        format!("{WORKFLOWS_DIR}/{owner}/{id}.json")
    }

    async fn read(&self, path: &str) -> Result<Option<Workflow>> {
        let buffer = match self.operator.read(path).await {
            Ok(buffer) => buffer,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let workflow = serde_json::from_slice(&buffer.to_vec()).map_err(|e| {
            ServiceError::storage_with_source(format!("Corrupt workflow document: {path}"), e)
        })?;

        Ok(Some(workflow))
    }

    async fn write(&self, owner: Uuid, mut workflow: Workflow) -> Result<Workflow> {
        let clean = sanitize(&workflow.graph());
        workflow.nodes = clean.nodes;
        workflow.edges = clean.edges;

        let bytes = serde_json::to_vec(&workflow).map_err(|e| {
            ServiceError::storage_with_source("Failed to encode workflow document", e)
        })?;

        self.operator
            .write(&Self::document_path(workflow.id, owner), bytes)
            .await?;

        Ok(workflow)
    }
}

#[async_trait::async_trait]
impl WorkflowRepository for DocumentStore {
    async fn list(&self, owner: Uuid) -> Result<Vec<Workflow>> {
        let entries = match self.operator.list(&Self::owner_dir(owner)).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut workflows = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.metadata().mode() != EntryMode::FILE || !entry.path().ends_with(".json") {
                continue;
            }

            match self.read(entry.path()).await {
                Ok(Some(workflow)) => workflows.push(workflow),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(
                        target: TRACING_TARGET,
                        path = %entry.path(),
                        error = %err,
                        "Skipping unreadable workflow document"
                    );
                }
            }
        }

        workflows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(workflows)
    }

    async fn get(&self, id: WorkflowId, owner: Uuid) -> Result<Option<Workflow>> {
        self.read(&Self::document_path(id, owner)).await
    }

    async fn create(&self, owner: Uuid, name: Option<String>, graph: Graph) -> Result<Workflow> {
        let workflow = Workflow::new(name.unwrap_or_default(), graph);
        let workflow = self.write(owner, workflow).await?;

        tracing::info!(
            target: TRACING_TARGET,
            workflow_id = %workflow.id,
            owner_id = %owner,
            "Workflow created"
        );

        Ok(workflow)
    }

    async fn update(
        &self,
        id: WorkflowId,
        owner: Uuid,
        update: WorkflowUpdate,
    ) -> Result<Option<Workflow>> {
        let Some(mut workflow) = self.get(id, owner).await? else {
            return Ok(None);
        };

        if let Some(name) = update.name {
            workflow.name = if name.trim().is_empty() {
                DEFAULT_WORKFLOW_NAME.to_owned()
            } else {
                name
            };
        }
        if let Some(nodes) = update.nodes {
            workflow.nodes = nodes;
        }
        if let Some(edges) = update.edges {
            workflow.edges = edges;
        }
        workflow.touch();

        let workflow = self.write(owner, workflow).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            workflow_id = %workflow.id,
            owner_id = %owner,
            nodes = workflow.nodes.len(),
            edges = workflow.edges.len(),
            "Workflow updated"
        );

        Ok(Some(workflow))
    }

    async fn delete(&self, id: WorkflowId, owner: Uuid) -> Result<bool> {
        let path = Self::document_path(id, owner);
        if !self.operator.exists(&path).await? {
            return Ok(false);
        }

        self.operator.delete(&path).await?;

        tracing::info!(
            target: TRACING_TARGET,
            workflow_id = %id,
            owner_id = %owner,
            "Workflow deleted"
        );

        Ok(true)
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("scheme", &self.operator.info().scheme())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use opendal::services;
    use weave_runtime::graph::{GeneratorPatch, NodeType, Position};
    use weave_runtime::store::GraphStore;

    use super::*;

    fn store() -> DocumentStore {
        let operator = Operator::new(services::Memory::default())
            .map(|op| op.finish())
            .unwrap();
        DocumentStore::new(operator)
    }

    fn loading_graph() -> Graph {
        let mut store = GraphStore::new();
        let id = store.add_node(NodeType::Generator, Position::new(0.0, 0.0));
        store.update_node_data(&id, GeneratorPatch::run_started());
        store.graph().clone()
    }

    #[tokio::test]
    async fn create_defaults_name_and_sanitizes() {
        let store = store();
        let owner = Uuid::now_v7();

        let workflow = store
            .create(owner, None, loading_graph())
            .await
            .unwrap();
        assert_eq!(workflow.name, DEFAULT_WORKFLOW_NAME);

        let stored = store.get(workflow.id, owner).await.unwrap().unwrap();
        let generator = stored.nodes[0].as_generator().unwrap();
        assert!(!generator.is_loading);
        assert_eq!(stored, workflow);
    }

    #[tokio::test]
    async fn foreign_owner_sees_nothing() {
        let store = store();
        let owner = Uuid::now_v7();
        let stranger = Uuid::now_v7();

        let workflow = store
            .create(owner, Some("Mine".to_owned()), Graph::default())
            .await
            .unwrap();

        assert!(store.get(workflow.id, stranger).await.unwrap().is_none());
        assert!(store.list(stranger).await.unwrap().is_empty());

        let update = WorkflowUpdate {
            name: Some("Stolen".to_owned()),
            ..WorkflowUpdate::default()
        };
        assert!(store.update(workflow.id, stranger, update).await.unwrap().is_none());
        assert!(!store.delete(workflow.id, stranger).await.unwrap());

        let stored = store.get(workflow.id, owner).await.unwrap().unwrap();
        assert_eq!(stored.name, "Mine");
    }

    #[tokio::test]
    async fn update_applies_only_provided_fields() {
        let store = store();
        let owner = Uuid::now_v7();
        let workflow = store
            .create(owner, Some("Draft".to_owned()), loading_graph())
            .await
            .unwrap();

        let update = WorkflowUpdate {
            name: Some("Final".to_owned()),
            ..WorkflowUpdate::default()
        };
        let updated = store
            .update(workflow.id, owner, update)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Final");
        assert_eq!(updated.nodes, workflow.nodes);
        assert!(updated.updated_at >= workflow.updated_at);
        assert_eq!(updated.created_at, workflow.created_at);
    }

    #[tokio::test]
    async fn list_orders_by_most_recent_update() {
        let store = store();
        let owner = Uuid::now_v7();

        let first = store
            .create(owner, Some("First".to_owned()), Graph::default())
            .await
            .unwrap();
        store
            .create(owner, Some("Second".to_owned()), Graph::default())
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .update(first.id, owner, WorkflowUpdate::default())
            .await
            .unwrap();

        let names: Vec<_> = store
            .list(owner)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = store();
        let owner = Uuid::now_v7();
        let workflow = store
            .create(owner, None, Graph::default())
            .await
            .unwrap();

        assert!(store.delete(workflow.id, owner).await.unwrap());
        assert!(store.get(workflow.id, owner).await.unwrap().is_none());
        assert!(!store.delete(workflow.id, owner).await.unwrap());
    }
}

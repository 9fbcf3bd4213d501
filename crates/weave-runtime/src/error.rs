//! Workflow error types.

use thiserror::Error;

use crate::graph::NodeId;

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors that can occur during workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The node does not exist in the graph.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The node exists but cannot be used for the requested operation.
    #[error("invalid node {node_id}: {message}")]
    InvalidNode {
        /// ID of the offending node.
        node_id: NodeId,
        /// Error message.
        message: String,
    },

    /// The session has no loaded document.
    #[error("no workflow is loaded")]
    NotLoaded,

    /// The storage collaborator failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A durable image reference could not be fetched.
    #[error("failed to fetch image: {0}")]
    Fetch(String),

    /// Generation failed.
    #[error(transparent)]
    Generation(#[from] weave_rig::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    /// Creates an invalid node error.
    pub fn invalid_node(node_id: NodeId, message: impl Into<String>) -> Self {
        Self::InvalidNode {
            node_id,
            message: message.into(),
        }
    }

    /// Creates a fetch error.
    pub fn fetch(message: impl std::fmt::Display) -> Self {
        Self::Fetch(message.to_string())
    }

    /// Creates a storage error.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }
}

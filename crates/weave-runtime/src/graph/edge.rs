//! Edge types for connecting nodes in a workflow graph.

use derive_builder::Builder;
use derive_more::{Debug, Display, From, Into};
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NodeId;
use super::handle::{SourceHandle, TargetHandle};

/// Unique identifier for an edge in a workflow graph.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Debug, Display, From, Into)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[debug("{_0}")]
#[display("{_0}")]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Creates a new unique edge ID.
    pub fn generate() -> Self {
        Self(format!("edge_{}", Uuid::now_v7().simple()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EdgeId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A directed, handle-qualified connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    /// Unique edge id.
    pub id: EdgeId,
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Output port on the source node; `None` is the unlabeled output.
    #[serde(default)]
    pub source_handle: Option<String>,
    /// Input port on the target node.
    #[serde(default)]
    pub target_handle: Option<String>,
    /// Whether the edge is selected in the editor.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Edge {
    /// Creates an edge with a fresh id from a validated connection.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            id: EdgeId::generate(),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
            selected: false,
        }
    }

    /// Returns the parsed input port, if the target handle is a known port.
    pub fn target_port(&self) -> Option<TargetHandle> {
        self.target_handle.as_deref()?.parse().ok()
    }

    /// Returns the parsed output port, if the source handle is a known port.
    pub fn source_port(&self) -> Option<SourceHandle> {
        SourceHandle::parse_optional(self.source_handle.as_deref())
    }

    /// Returns true if the edge leaves or enters the node through the handle.
    pub fn touches(&self, node_id: &NodeId, handle: &str, side: super::HandleSide) -> bool {
        match side {
            super::HandleSide::Source => {
                &self.source == node_id && self.source_handle.as_deref() == Some(handle)
            }
            super::HandleSide::Target => {
                &self.target == node_id && self.target_handle.as_deref() == Some(handle)
            }
        }
    }
}

/// A candidate edge, before validation and id assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "camelCase")]
#[builder(
    name = "ConnectionBuilder",
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct Connection {
    /// Source node id.
    pub source: NodeId,
    /// Target node id.
    pub target: NodeId,
    /// Output port on the source node.
    #[serde(default)]
    #[builder(default)]
    pub source_handle: Option<String>,
    /// Input port on the target node.
    #[serde(default)]
    #[builder(default)]
    pub target_handle: Option<String>,
}

impl ConnectionBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.source.is_none() {
            return Err("source is required".into());
        }
        if self.target.is_none() {
            return Err("target is required".into());
        }
        Ok(())
    }
}

impl Connection {
    /// Creates a connection between two nodes.
    pub fn new(
        source: impl Into<NodeId>,
        source_handle: Option<&str>,
        target: impl Into<NodeId>,
        target_handle: Option<&str>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.map(str::to_owned),
            target_handle: target_handle.map(str::to_owned),
        }
    }

    /// Returns a builder for creating a connection.
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HandleSide;

    #[test]
    fn builder_requires_both_endpoints() {
        let connection = Connection::builder()
            .with_source("text_1")
            .with_target("llm_1")
            .with_target_handle("prompt")
            .build()
            .unwrap();
        assert_eq!(connection.source_handle, None);
        assert_eq!(connection.target_handle.as_deref(), Some("prompt"));

        assert!(Connection::builder().with_source("text_1").build().is_err());
    }

    #[test]
    fn edge_parses_its_ports() {
        let edge = Edge::from_connection(Connection::new(
            "llm_1",
            Some("image-output"),
            "llm_2",
            Some("image-1"),
        ));
        assert!(edge.id.as_str().starts_with("edge_"));
        assert_eq!(edge.source_port(), Some(SourceHandle::ImageOutput));
        assert_eq!(edge.target_port(), Some(TargetHandle::Image(1)));
        assert!(edge.touches(&NodeId::from("llm_2"), "image-1", HandleSide::Target));
        assert!(!edge.touches(&NodeId::from("llm_2"), "image-1", HandleSide::Source));
    }

    #[test]
    fn deserializes_null_handles() {
        let edge: Edge = serde_json::from_str(
            r#"{"id":"e1","source":"a","target":"b","sourceHandle":null,"targetHandle":"prompt"}"#,
        )
        .unwrap();
        assert_eq!(edge.source_port(), Some(SourceHandle::Output));
        assert_eq!(edge.target_port(), Some(TargetHandle::Prompt));
    }
}

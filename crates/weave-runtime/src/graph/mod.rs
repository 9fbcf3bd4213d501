//! Workflow graph model.
//!
//! Nodes are a tagged union over three kinds (text, image, generator) and
//! edges connect named handles. All handle and validation logic dispatches on
//! the node kind tag.

mod change;
mod edge;
mod handle;
mod node;
mod patch;
mod position;

pub use change::{EdgeChange, NodeChange};
pub use edge::{Connection, ConnectionBuilder, Edge, EdgeId};
pub use handle::{HandleSide, MAX_IMAGE_INPUTS, SourceHandle, TargetHandle};
pub use node::{GeneratorData, ImageData, Node, NodeId, NodeKind, NodeType, TextData};
pub use patch::{GeneratorPatch, ImagePatch, NodePatch, TextPatch};
pub use position::Position;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The node and edge collections of a workflow.
///
/// Also serves as the history snapshot type: cloning a graph is a deep copy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Graph {
    /// Nodes in insertion order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in insertion order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Creates a graph from nodes and edges.
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == id)
    }

    /// Returns a mutable reference to the node with the given id.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| &node.id == id)
    }

    /// Returns the edges terminating at the given node.
    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |edge| &edge.target == id)
    }

    /// Returns true if any generator node is mid-generation.
    pub fn any_generating(&self) -> bool {
        self.nodes.iter().any(Node::is_generating)
    }

    /// Removes a node and every edge incident to it.
    ///
    /// Returns false if the node does not exist.
    pub(crate) fn remove_node(&mut self, id: &NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|node| &node.id != id);
        if self.nodes.len() == before {
            return false;
        }

        self.edges
            .retain(|edge| &edge.source != id && &edge.target != id);
        true
    }
}

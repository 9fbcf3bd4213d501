//! The graph store: the single mutation surface for a workflow graph.
//!
//! Every operation states whether it records history. Structural edits run
//! through [`GraphStore::recorded`], which snapshots the pre-mutation graph;
//! high-frequency field edits run through [`GraphStore::unrecorded`].

mod history;
mod rules;

pub use history::{HISTORY_LIMIT, History};
pub use rules::{Rejection, validate};

use crate::graph::{
    Connection, Edge, EdgeChange, EdgeId, Graph, HandleSide, MAX_IMAGE_INPUTS, Node, NodeChange,
    NodeId, NodeKind, NodePatch, NodeType, Position,
};

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "weave_runtime::store";

/// Owns a workflow graph and its undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    graph: Graph,
    history: History,
}

impl GraphStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given graph, with empty history.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            history: History::default(),
        }
    }

    /// Returns the live graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the live nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.graph.nodes
    }

    /// Returns the live edges.
    pub fn edges(&self) -> &[Edge] {
        &self.graph.edges
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Returns a deep copy of the live graph.
    pub fn snapshot(&self) -> Graph {
        self.graph.clone()
    }

    /// Runs a structural edit after recording the pre-mutation graph.
    fn recorded<R>(&mut self, mutate: impl FnOnce(&mut Graph) -> R) -> R {
        self.history.record(self.graph.clone());
        mutate(&mut self.graph)
    }

    /// Runs an edit that is not part of undo granularity.
    fn unrecorded<R>(&mut self, mutate: impl FnOnce(&mut Graph) -> R) -> R {
        mutate(&mut self.graph)
    }

    /// Replaces the whole graph (load or import) and resets history.
    pub fn replace(&mut self, graph: Graph) {
        tracing::debug!(
            target: TRACING_TARGET,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "Replacing graph"
        );

        self.graph = graph;
        self.history.clear();
    }

    /// Applies a batch of node changes. Does not record history.
    ///
    /// Changes that target a missing node are dropped; the rest apply.
    /// Returns the number of applied changes.
    pub fn apply_node_changes(&mut self, changes: impl IntoIterator<Item = NodeChange>) -> usize {
        self.unrecorded(|graph| {
            changes
                .into_iter()
                .filter(|change| match change {
                    NodeChange::Position { id, position } => match graph.node_mut(id) {
                        Some(node) => {
                            if let Some(position) = position {
                                node.position = *position;
                            }
                            true
                        }
                        None => false,
                    },
                    NodeChange::Select { id, selected } => match graph.node_mut(id) {
                        Some(node) => {
                            node.selected = *selected;
                            true
                        }
                        None => false,
                    },
                    NodeChange::Remove { id } => graph.remove_node(id),
                })
                .count()
        })
    }

    /// Applies a batch of edge changes. Does not record history.
    ///
    /// Changes that target a missing edge are dropped; the rest apply.
    /// Returns the number of applied changes.
    pub fn apply_edge_changes(&mut self, changes: impl IntoIterator<Item = EdgeChange>) -> usize {
        self.unrecorded(|graph| {
            changes
                .into_iter()
                .filter(|change| match change {
                    EdgeChange::Select { id, selected } => {
                        match graph.edges.iter_mut().find(|edge| &edge.id == id) {
                            Some(edge) => {
                                edge.selected = *selected;
                                true
                            }
                            None => false,
                        }
                    }
                    EdgeChange::Remove { id } => {
                        let before = graph.edges.len();
                        graph.edges.retain(|edge| &edge.id != id);
                        graph.edges.len() != before
                    }
                })
                .count()
        })
    }

    /// Adds an edge if the connection passes validation. Records history on success.
    ///
    /// Rejections leave the graph and history untouched; they are not errors.
    pub fn connect(&mut self, connection: Connection) -> Result<EdgeId, Rejection> {
        if let Err(rejection) = validate(&self.graph, &connection) {
            tracing::debug!(
                target: TRACING_TARGET,
                source = %connection.source,
                target = %connection.target,
                target_handle = ?connection.target_handle,
                reason = ?rejection,
                "Connection rejected"
            );
            return Err(rejection);
        }

        let edge = Edge::from_connection(connection);
        let id = edge.id.clone();
        self.recorded(|graph| graph.edges.push(edge));
        Ok(id)
    }

    /// Adds a node with the default payload for its type. Records history.
    pub fn add_node(&mut self, node_type: NodeType, position: Position) -> NodeId {
        let node = Node::with_defaults(node_type, position);
        let id = node.id.clone();
        self.recorded(|graph| graph.nodes.push(node));

        tracing::debug!(
            target: TRACING_TARGET,
            node_id = %id,
            node_type = %node_type,
            "Node added"
        );

        id
    }

    /// Shallow-merges a patch into a node payload. Does not record history.
    ///
    /// Returns false if the node is missing or the patch targets another kind.
    pub fn update_node_data(&mut self, id: &NodeId, patch: impl Into<NodePatch>) -> bool {
        let patch = patch.into();
        self.unrecorded(|graph| {
            graph
                .node_mut(id)
                .is_some_and(|node| node.kind.apply(patch))
        })
    }

    /// Adds one more image input handle to a generator. Does not record history.
    ///
    /// Returns false if the node is not a generator or already has the maximum.
    pub fn add_image_input(&mut self, id: &NodeId) -> bool {
        self.unrecorded(|graph| match graph.node_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Generator(data)) if data.image_input_count < MAX_IMAGE_INPUTS => {
                data.image_input_count += 1;
                true
            }
            _ => false,
        })
    }

    /// Removes a node and every incident edge. Records history if the node exists.
    pub fn delete_node(&mut self, id: &NodeId) -> bool {
        if self.graph.node(id).is_none() {
            return false;
        }

        self.recorded(|graph| graph.remove_node(id))
    }

    /// Removes the edge attached to a node handle. Records history if one is found.
    pub fn delete_edge_by_handle(&mut self, node_id: &NodeId, handle: &str, side: HandleSide) -> bool {
        let Some(index) = self
            .graph
            .edges
            .iter()
            .position(|edge| edge.touches(node_id, handle, side))
        else {
            return false;
        };

        self.recorded(|graph| graph.edges.remove(index));
        true
    }

    /// Steps back one structural edit. No-op at the start of history.
    pub fn undo(&mut self) -> bool {
        let live = self.graph.clone();
        match self.history.undo(live) {
            Some(previous) => {
                self.graph = previous;
                true
            }
            None => false,
        }
    }

    /// Steps forward one structural edit. No-op at the end of history.
    pub fn redo(&mut self) -> bool {
        let live = self.graph.clone();
        match self.history.redo(live) {
            Some(next) => {
                self.graph = next;
                true
            }
            None => false,
        }
    }

    /// Returns true if [`undo`](Self::undo) would change the graph.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if [`redo`](Self::redo) would change the graph.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Returns the number of stored history snapshots.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

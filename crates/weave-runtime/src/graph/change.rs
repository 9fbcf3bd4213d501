//! Structural deltas emitted by the editor canvas.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{EdgeId, NodeId, Position};

/// A structural change to a single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeChange {
    /// Moves a node.
    Position {
        id: NodeId,
        #[serde(default)]
        position: Option<Position>,
    },
    /// Selects or deselects a node.
    Select { id: NodeId, selected: bool },
    /// Removes a node and its incident edges.
    Remove { id: NodeId },
}

impl NodeChange {
    /// Returns the id of the node this change targets.
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Position { id, .. } | Self::Select { id, .. } | Self::Remove { id } => id,
        }
    }
}

/// A structural change to a single edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EdgeChange {
    /// Selects or deselects an edge.
    Select { id: EdgeId, selected: bool },
    /// Removes an edge.
    Remove { id: EdgeId },
}

impl EdgeChange {
    /// Returns the id of the edge this change targets.
    pub fn id(&self) -> &EdgeId {
        match self {
            Self::Select { id, .. } | Self::Remove { id } => id,
        }
    }
}

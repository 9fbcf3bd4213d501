//! Connection validation.

use crate::graph::{Connection, Graph, NodeKind, SourceHandle, TargetHandle};

/// Why a candidate connection was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The target port already has an incoming edge.
    PortOccupied,
    /// The source or target node does not exist.
    UnknownNode,
    /// A handle is not exposed by its node.
    UnknownHandle,
    /// The source cannot feed the target port.
    IncompatibleSource,
}

/// Validates a candidate connection against the current graph.
pub fn validate(graph: &Graph, connection: &Connection) -> Result<(), Rejection> {
    let source = graph
        .node(&connection.source)
        .ok_or(Rejection::UnknownNode)?;
    let target = graph
        .node(&connection.target)
        .ok_or(Rejection::UnknownNode)?;

    let source_handle = SourceHandle::parse_optional(connection.source_handle.as_deref())
        .filter(|handle| source.exposes_source(*handle))
        .ok_or(Rejection::UnknownHandle)?;
    let target_handle = connection
        .target_handle
        .as_deref()
        .and_then(|handle| handle.parse::<TargetHandle>().ok())
        .filter(|handle| target.exposes_target(*handle))
        .ok_or(Rejection::UnknownHandle)?;

    let occupied = graph.edges.iter().any(|edge| {
        edge.target == connection.target && edge.target_port() == Some(target_handle)
    });
    if occupied {
        return Err(Rejection::PortOccupied);
    }

    let compatible = match (target_handle, &source.kind) {
        (TargetHandle::Image(_), NodeKind::Image(_)) => true,
        (TargetHandle::Image(_), NodeKind::Generator(_)) => {
            source_handle == SourceHandle::ImageOutput
        }
        (TargetHandle::Image(_), NodeKind::Text(_)) => false,
        (TargetHandle::Prompt, NodeKind::Image(_)) => false,
        (TargetHandle::Prompt, _) => true,
    };

    if compatible {
        Ok(())
    } else {
        Err(Rejection::IncompatibleSource)
    }
}

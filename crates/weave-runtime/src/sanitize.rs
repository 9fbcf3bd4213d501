//! Storage-safe snapshots of a live graph.
//!
//! Transient run state never reaches storage, and every image node keeps
//! exactly one durable form: a remote reference without inline bytes, or the
//! inline bytes mirrored into `imageUrl` as a display fallback.

use crate::graph::{Graph, Node, NodeKind};

/// Rewrites a single node into its persisted form.
pub fn sanitize_node(node: &mut Node) {
    match &mut node.kind {
        NodeKind::Generator(data) => {
            data.is_loading = false;
            data.error = None;
        }
        NodeKind::Image(data) => {
            if data.remote_url().is_some() {
                data.image_base64 = None;
            } else if let Some(inline) = &data.image_base64 {
                data.image_url = Some(inline.clone());
            }
        }
        NodeKind::Text(_) => {}
    }
}

/// Returns the storage-safe copy of a graph. Idempotent.
pub fn sanitize(graph: &Graph) -> Graph {
    let mut graph = graph.clone();
    graph.nodes.iter_mut().for_each(sanitize_node);
    graph
}

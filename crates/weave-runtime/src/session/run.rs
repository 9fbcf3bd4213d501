//! Per-node run sequencing.
//!
//! Every run is issued an increasing sequence number. A result
//! is applied only if its ticket is still the latest issued for that node, so
//! a slow earlier run cannot overwrite a newer one.

use std::collections::HashMap;

use crate::graph::NodeId;

/// Identifies one run of one generator node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTicket {
    /// Node being run.
    pub node_id: NodeId,
    /// Sequence number of the run.
    pub sequence: u64,
}

/// Issues run tickets and tracks the latest one per node.
#[derive(Debug, Clone, Default)]
pub struct RunSequencer {
    next: u64,
    latest: HashMap<NodeId, u64>,
}

impl RunSequencer {
    /// Issues a ticket that supersedes every earlier ticket for the node.
    pub fn issue(&mut self, node_id: &NodeId) -> RunTicket {
        self.next += 1;
        self.latest.insert(node_id.clone(), self.next);

        RunTicket {
            node_id: node_id.clone(),
            sequence: self.next,
        }
    }

    /// Returns true if no newer ticket was issued for the ticket's node.
    pub fn is_current(&self, ticket: &RunTicket) -> bool {
        self.latest.get(&ticket.node_id) == Some(&ticket.sequence)
    }

    /// Forgets every issued ticket, making all of them stale.
    pub fn reset(&mut self) {
        self.latest.clear();
    }
}

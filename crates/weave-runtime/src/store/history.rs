//! Bounded undo/redo history.

use std::collections::VecDeque;

use crate::graph::Graph;

/// Maximum number of snapshots kept in history.
pub const HISTORY_LIMIT: usize = 50;

/// A linear undo/redo log of graph snapshots.
///
/// Entries before the cursor are undo targets, entries from the cursor on are
/// redo targets. Recording a new snapshot discards every redo target.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<Graph>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl History {
    /// Creates an empty history holding at most `limit` snapshots.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Records the state before a structural edit.
    pub fn record(&mut self, before: Graph) {
        self.entries.truncate(self.cursor);
        self.entries.push_back(before);
        if self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len();
    }

    /// Steps back, returning the state to restore.
    ///
    /// The live state is kept in its place so a later redo can return to it.
    pub fn undo(&mut self, live: Graph) -> Option<Graph> {
        if self.cursor == 0 {
            return None;
        }

        self.cursor -= 1;
        Some(std::mem::replace(&mut self.entries[self.cursor], live))
    }

    /// Steps forward, returning the state to restore.
    pub fn redo(&mut self, live: Graph) -> Option<Graph> {
        if self.cursor == self.entries.len() {
            return None;
        }

        let next = std::mem::replace(&mut self.entries[self.cursor], live);
        self.cursor += 1;
        Some(next)
    }

    /// Returns true if there is a state to step back to.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there is a state to step forward to.
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    /// Returns the number of stored snapshots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no snapshots are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Node, NodeType, Position};

    fn graph_with(count: usize) -> Graph {
        let nodes = (0..count)
            .map(|_| Node::with_defaults(NodeType::Text, Position::default()))
            .collect();
        Graph::new(nodes, Vec::new())
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut history = History::default();
        assert!(history.undo(Graph::default()).is_none());
        assert!(history.redo(Graph::default()).is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn oldest_entry_is_discarded_past_the_limit() {
        let mut history = History::default();
        let first = graph_with(1);
        history.record(first.clone());
        for _ in 0..HISTORY_LIMIT {
            history.record(Graph::default());
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert!(history.entries.iter().all(|entry| entry != &first));
    }

    #[test]
    fn recording_discards_redo_targets() {
        let mut history = History::default();
        history.record(graph_with(0));
        history.record(graph_with(1));

        let live = graph_with(2);
        let restored = history.undo(live).unwrap();
        assert_eq!(restored.nodes.len(), 1);
        assert!(history.can_redo());

        history.record(restored);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
    }
}

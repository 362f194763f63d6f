//! Snapshot diffing for live client updates

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::model::{Edge, Node};

/// Change between two snapshots, broadcast to connected clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDiff {
    /// Monotonically increasing diff sequence number.
    pub sequence: u64,
    pub added_nodes: Vec<Node>,
    pub removed_nodes: Vec<String>,
    /// Ids of nodes present in both snapshots whose name or attributes changed.
    pub modified_nodes: Vec<String>,
    pub added_edges: Vec<Edge>,
    pub removed_edges: Vec<String>,
}

impl GraphDiff {
    pub fn new(sequence: u64) -> Self {
        GraphDiff {
            sequence,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty()
            && self.removed_nodes.is_empty()
            && self.modified_nodes.is_empty()
            && self.added_edges.is_empty()
            && self.removed_edges.is_empty()
    }
}

/// Assigns sequence numbers to successive diffs.
#[derive(Debug, Default)]
pub struct DiffEngine {
    sequence: u64,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute what changed from `old` to `new`, in each graph's iteration order.
    ///
    /// Only non-empty diffs take a new sequence number; an empty diff carries
    /// the current one, so published sequences have no gaps.
    pub fn compute_diff(&mut self, old: &Graph, new: &Graph) -> GraphDiff {
        let mut diff = GraphDiff::default();

        for node in new.nodes() {
            match old.node(&node.id) {
                None => diff.added_nodes.push(node.clone()),
                Some(prev) if prev != node => diff.modified_nodes.push(node.id.clone()),
                Some(_) => {}
            }
        }
        diff.removed_nodes = old
            .nodes()
            .filter(|n| !new.contains_node(&n.id))
            .map(|n| n.id.clone())
            .collect();

        diff.added_edges = new
            .edges()
            .filter(|e| old.edge(&e.id).is_none())
            .cloned()
            .collect();
        diff.removed_edges = old
            .edges()
            .filter(|e| new.edge(&e.id).is_none())
            .map(|e| e.id.clone())
            .collect();

        if !diff.is_empty() {
            self.sequence += 1;
        }
        diff.sequence = self.sequence;
        diff
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

//! Graph wrapper using petgraph::DiGraph with string-keyed node/edge lookup

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};
use crate::model::{Edge, Node};

/// A labeled graph snapshot.
///
/// Nodes and edges iterate in insertion order. Nothing is ever physically
/// removed from the petgraph storage: removals rebuild a fresh graph from the
/// survivors, so indices stay dense and relative order is preserved.
#[derive(Clone)]
pub struct Graph {
    directed: bool,
    inner: DiGraph<Node, Edge>,
    node_index: HashMap<String, NodeIndex>,
    edge_index: HashMap<String, EdgeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("directed", &self.directed)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

/// Content equality: same direction flag, same nodes and edges in the same order.
impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.nodes().eq(other.nodes())
            && self.edges().eq(other.edges())
    }
}

impl Graph {
    pub fn new(directed: bool) -> Self {
        Graph {
            directed,
            inner: DiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
        }
    }

    /// Build a graph from ordered parts, validating every invariant.
    pub fn from_parts(
        directed: bool,
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self> {
        let mut graph = Graph::new(directed);
        for node in nodes {
            graph.add_node(node)?;
        }
        for edge in edges {
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }

    pub fn directed(&self) -> bool {
        self.directed
    }

    /// Add a node. Fails if the id is empty or already present.
    pub fn add_node(&mut self, node: Node) -> Result<()> {
        if node.id.is_empty() {
            return Err(EngineError::validation("node id must not be empty"));
        }
        if self.node_index.contains_key(&node.id) {
            return Err(EngineError::validation(format!(
                "node with id '{}' already exists",
                node.id
            )));
        }
        let id = node.id.clone();
        let idx = self.inner.add_node(node);
        self.node_index.insert(id, idx);
        Ok(())
    }

    /// Add an edge. Both endpoints must already be in this graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        if self.edge_index.contains_key(&edge.id) {
            return Err(EngineError::validation(format!(
                "edge with id '{}' already exists",
                edge.id
            )));
        }
        let Some(&source) = self.node_index.get(&edge.source) else {
            return Err(EngineError::validation(format!(
                "source node with id '{}' not found",
                edge.source
            )));
        };
        let Some(&target) = self.node_index.get(&edge.target) else {
            return Err(EngineError::validation(format!(
                "target node with id '{}' not found",
                edge.target
            )));
        };
        let id = edge.id.clone();
        let idx = self.inner.add_edge(source, target, edge);
        self.edge_index.insert(id, idx);
        Ok(())
    }

    /// Remove a node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let removed = self.node(id)?.clone();
        *self = self.rebuild(|n| n.id != id, |e| !e.touches(id));
        Some(removed)
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: &str) -> Option<Edge> {
        let removed = self.edge(id)?.clone();
        *self = self.rebuild(|_| true, |e| e.id != id);
        Some(removed)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index
            .get(id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = *self.node_index.get(id)?;
        self.inner.node_weight_mut(idx)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edge_index
            .get(id)
            .and_then(|&idx| self.inner.edge_weight(idx))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.inner.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Iterate over edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.inner.raw_edges().iter().map(|e| &e.weight)
    }

    /// Nodes adjacent to `id` in either direction, each listed once, in node order.
    pub fn neighbors(&self, id: &str) -> Vec<&Node> {
        let Some(&idx) = self.node_index.get(id) else {
            return Vec::new();
        };
        let adjacent: HashSet<NodeIndex> = self
            .inner
            .neighbors_directed(idx, Direction::Outgoing)
            .chain(self.inner.neighbors_directed(idx, Direction::Incoming))
            .collect();
        self.inner
            .node_indices()
            .filter(|i| adjacent.contains(i))
            .filter_map(|i| self.inner.node_weight(i))
            .collect()
    }

    /// Copy of the nodes in `keep` plus exactly the edges whose endpoints both survive.
    pub fn induced_subgraph<S>(&self, keep: &HashSet<S>) -> Graph
    where
        S: std::hash::Hash + Eq + std::borrow::Borrow<str>,
    {
        self.rebuild(
            |n| keep.contains(n.id.as_str()),
            |e| keep.contains(e.source.as_str()) && keep.contains(e.target.as_str()),
        )
    }

    /// Fresh graph holding clones of the nodes and edges that pass the predicates.
    /// Edges whose endpoints did not survive are always dropped.
    fn rebuild(&self, keep_node: impl Fn(&Node) -> bool, keep_edge: impl Fn(&Edge) -> bool) -> Graph {
        let mut out = Graph::new(self.directed);
        for node in self.nodes().filter(|n| keep_node(n)) {
            let idx = out.inner.add_node(node.clone());
            out.node_index.insert(node.id.clone(), idx);
        }
        for edge in self.edges().filter(|e| keep_edge(e)) {
            let (Some(&s), Some(&t)) = (out.node_index.get(&edge.source), out.node_index.get(&edge.target))
            else {
                continue;
            };
            let idx = out.inner.add_edge(s, t, edge.clone());
            out.edge_index.insert(edge.id.clone(), idx);
        }
        out
    }
}

/// Wire form of a graph, used for (de)serialization.
#[derive(Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    nodes: Vec<Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        GraphData {
            directed: self.directed,
            nodes: self.nodes().cloned().collect(),
            edges: self.edges().cloned().collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let data = GraphData::deserialize(deserializer)?;
        Graph::from_parts(data.directed, data.nodes, data.edges).map_err(serde::de::Error::custom)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(false)
    }
}

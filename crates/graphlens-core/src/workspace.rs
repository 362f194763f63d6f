//! Versioned query pipeline over one editable baseline graph

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::{Attributes, AttrValue, Edge, Node, DEFAULT_EDGE_TYPE};
use crate::query;

/// The two query strategies a workspace can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    Search,
    Filter,
}

impl QueryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryKind::Search => "search",
            QueryKind::Filter => "filter",
        }
    }

    /// Derive the next snapshot from `graph`.
    pub fn apply(self, graph: &Graph, value: &str) -> Result<Graph> {
        match self {
            QueryKind::Search => Ok(query::search(graph, value)),
            QueryKind::Filter => query::filter(graph, value),
        }
    }

    pub fn label(self, value: &str) -> String {
        format!("{}: {}", self.as_str(), value)
    }
}

/// Immutable record of one applied query step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub kind: QueryKind,
    pub value: String,
    pub label: String,
}

impl Query {
    pub fn new(kind: QueryKind, value: impl Into<String>) -> Self {
        let value = value.into();
        Query {
            kind,
            label: kind.label(&value),
            value,
        }
    }
}

/// Payload for [`Workspace::create_node`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewNode {
    #[serde(default)]
    pub id: String,
    /// Display name; defaults to the id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl NewNode {
    pub fn new(id: impl Into<String>) -> Self {
        NewNode {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// Node and edge counts of the baseline and current snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkspaceStats {
    pub nodes: usize,
    pub edges: usize,
    pub baseline_nodes: usize,
    pub baseline_edges: usize,
    pub queries: usize,
}

/// One baseline graph plus the snapshots derived from it by applying queries in order.
///
/// `history[0]` is the baseline and `history.len() == queries.len() + 1` at all times.
/// Snapshots are shared immutably; every change produces new graphs.
#[derive(Debug, Clone)]
pub struct Workspace {
    history: Vec<Arc<Graph>>,
    queries: Vec<Query>,
}

impl Workspace {
    pub fn new(baseline: Graph) -> Self {
        Workspace {
            history: vec![Arc::new(baseline)],
            queries: Vec::new(),
        }
    }

    pub fn baseline(&self) -> &Arc<Graph> {
        &self.history[0]
    }

    pub fn current(&self) -> &Arc<Graph> {
        self.history.last().unwrap_or(&self.history[0])
    }

    pub fn history(&self) -> &[Arc<Graph>] {
        &self.history
    }

    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    pub fn stats(&self) -> WorkspaceStats {
        let current = self.current();
        let baseline = self.baseline();
        WorkspaceStats {
            nodes: current.node_count(),
            edges: current.edge_count(),
            baseline_nodes: baseline.node_count(),
            baseline_edges: baseline.edge_count(),
            queries: self.queries.len(),
        }
    }

    pub fn apply_search(&mut self, text: &str) -> Result<Arc<Graph>> {
        self.apply(QueryKind::Search, text)
    }

    pub fn apply_filter(&mut self, expr: &str) -> Result<Arc<Graph>> {
        self.apply(QueryKind::Filter, expr)
    }

    /// Apply one query to the current snapshot. Blank input is a no-op.
    pub fn apply(&mut self, kind: QueryKind, value: &str) -> Result<Arc<Graph>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Arc::clone(self.current()));
        }
        let next = Arc::new(kind.apply(self.current(), value)?);
        tracing::debug!(
            "Applied {} '{}': {} -> {} nodes",
            kind.as_str(),
            value,
            self.current().node_count(),
            next.node_count()
        );
        self.history.push(Arc::clone(&next));
        self.queries.push(Query::new(kind, value));
        Ok(next)
    }

    /// Drop every query and return to the baseline.
    pub fn reset(&mut self) -> Arc<Graph> {
        self.history.truncate(1);
        self.queries.clear();
        Arc::clone(self.baseline())
    }

    /// Remove the query at `index` and replay the rest from the baseline.
    pub fn remove_query(&mut self, index: usize) -> Result<Arc<Graph>> {
        if index >= self.queries.len() {
            return Err(EngineError::not_found("query", index.to_string()));
        }
        let kept: Vec<Query> = self
            .queries
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != index)
            .map(|(_, q)| q.clone())
            .collect();
        let history = replay(Arc::clone(self.baseline()), &kept)?;
        self.history = history;
        self.queries = kept;
        Ok(Arc::clone(self.current()))
    }

    /// Add a node to the baseline. The payload id must be non-empty and unused.
    pub fn create_node(&mut self, data: NewNode) -> Result<Arc<Graph>> {
        if data.id.trim().is_empty() {
            return Err(EngineError::validation("node data must contain an 'id'"));
        }
        self.edit(|graph| {
            let name = data.label.unwrap_or_else(|| data.id.clone());
            let mut node = Node::new(data.id, name);
            node.attributes = data.attributes;
            graph.add_node(node)
        })
    }

    /// Update a baseline node. The `name` key renames it; every other key upserts an attribute.
    pub fn update_node(&mut self, id: &str, updates: Attributes) -> Result<Arc<Graph>> {
        self.edit(|graph| {
            let node = graph
                .node_mut(id)
                .ok_or_else(|| EngineError::not_found("node", id))?;
            for (key, value) in updates {
                if key == "name" {
                    node.name = value.to_string();
                } else {
                    node.attributes.insert(key, value);
                }
            }
            Ok(())
        })
    }

    /// Remove a baseline node and its edges.
    pub fn delete_node(&mut self, id: &str) -> Result<Arc<Graph>> {
        self.edit(|graph| {
            graph
                .remove_node(id)
                .map(|_| ())
                .ok_or_else(|| EngineError::not_found("node", id))
        })
    }

    /// Connect two baseline nodes. The edge inherits the graph's direction flag.
    pub fn create_edge(&mut self, from: &str, to: &str, kind: Option<&str>) -> Result<Arc<Graph>> {
        self.edit(|graph| {
            for (role, id) in [("source", from), ("target", to)] {
                if !graph.contains_node(id) {
                    return Err(EngineError::validation(format!(
                        "{role} node with id '{id}' not found"
                    )));
                }
            }
            let kind = kind
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .unwrap_or(DEFAULT_EDGE_TYPE);
            graph.add_edge(Edge::new(from, to, kind, graph.directed()))
        })
    }

    /// Remove a baseline edge.
    pub fn delete_edge(&mut self, id: &str) -> Result<Arc<Graph>> {
        self.edit(|graph| {
            graph
                .remove_edge(id)
                .map(|_| ())
                .ok_or_else(|| EngineError::not_found("edge", id))
        })
    }

    /// Mutate a copy of the baseline, then replay every recorded query against it.
    ///
    /// Nothing is committed unless both the edit and the replay succeed.
    fn edit(&mut self, mutate: impl FnOnce(&mut Graph) -> Result<()>) -> Result<Arc<Graph>> {
        let mut baseline = Graph::clone(self.baseline());
        mutate(&mut baseline)?;
        let history = replay(Arc::new(baseline), &self.queries)?;
        self.history = history;
        tracing::debug!(
            "Baseline edited, replayed {} queries; current has {} nodes",
            self.queries.len(),
            self.current().node_count()
        );
        Ok(Arc::clone(self.current()))
    }
}

/// Rebuild a history from `baseline` by applying `queries` in order.
fn replay(baseline: Arc<Graph>, queries: &[Query]) -> Result<Vec<Arc<Graph>>> {
    let mut history = Vec::with_capacity(queries.len() + 1);
    history.push(baseline);
    for query in queries {
        let previous = &history[history.len() - 1];
        let next = query.kind.apply(previous, &query.value)?;
        history.push(Arc::new(next));
    }
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ages_graph, node_ids, people_graph};

    #[test]
    fn test_query_labels() {
        let q = Query::new(QueryKind::Filter, "age > 3");
        assert_eq!(q.label, "filter: age > 3");
        assert_eq!(QueryKind::Search.label("bob"), "search: bob");
    }

    #[test]
    fn test_blank_query_is_noop() {
        let mut ws = Workspace::new(people_graph());
        let before = Arc::clone(ws.current());
        let after = ws.apply_search("  ").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        ws.apply_filter("").unwrap();
        assert_eq!(ws.history().len(), 1);
        assert!(ws.queries().is_empty());
    }

    #[test]
    fn test_apply_appends_history() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        ws.apply_search("b").unwrap();
        assert_eq!(ws.history().len(), ws.queries().len() + 1);
        assert_eq!(node_ids(ws.current()), ["B"]);
        assert_eq!(node_ids(&ws.history()[1]), ["A", "B"]);
        assert_eq!(ws.queries()[1].label, "search: b");
    }

    #[test]
    fn test_failed_query_leaves_history() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        assert!(ws.apply_filter("age > abc").is_err());
        assert!(ws.apply_filter("weight > 3").is_err());
        assert_eq!(ws.queries().len(), 1);
        assert_eq!(ws.history().len(), 2);
    }

    #[test]
    fn test_remove_query_replays_remaining() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        ws.apply_search("b").unwrap();

        let mut without_filter = ws.clone();
        without_filter.remove_query(0).unwrap();
        assert_eq!(node_ids(without_filter.current()), ["B"]);
        assert_eq!(without_filter.queries().len(), 1);
        assert_eq!(without_filter.queries()[0].kind, QueryKind::Search);

        ws.remove_query(1).unwrap();
        assert_eq!(node_ids(ws.current()), ["A", "B"]);
        assert_eq!(ws.history().len(), 2);
    }

    #[test]
    fn test_remove_query_out_of_range() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        let err = ws.remove_query(3).unwrap_err();
        assert!(matches!(err, EngineError::NotFound { kind: "query", .. }));
        assert_eq!(ws.queries().len(), 1);
    }

    #[test]
    fn test_reset_then_replay_reproduces_current() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        ws.apply_search("b").unwrap();
        let before = Arc::clone(ws.current());

        let baseline = ws.reset();
        assert_eq!(*baseline, ages_graph());
        assert_eq!(ws.history().len(), 1);
        assert!(ws.queries().is_empty());

        ws.apply_filter("age>25").unwrap();
        ws.apply_search("b").unwrap();
        assert_eq!(**ws.current(), *before);
        assert!(!Arc::ptr_eq(ws.current(), &before));
    }

    #[test]
    fn test_create_node_twice() {
        let mut ws = Workspace::new(Graph::new(false));
        ws.create_node(NewNode::new("x")).unwrap();
        let err = ws.create_node(NewNode::new("x")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(ws.baseline().node_count(), 1);
        assert_eq!(node_ids(ws.current()), ["x"]);
    }

    #[test]
    fn test_create_node_requires_id() {
        let mut ws = Workspace::new(Graph::new(false));
        let err = ws.create_node(NewNode::new(" ")).unwrap_err();
        assert_eq!(err, EngineError::validation("node data must contain an 'id'"));
    }

    #[test]
    fn test_edit_replays_queries() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();

        ws.create_node(NewNode::new("D").with_attr("age", 50)).unwrap();
        assert_eq!(node_ids(ws.current()), ["A", "B", "D"]);
        assert_eq!(ws.queries().len(), 1);

        let mut updates = Attributes::new();
        updates.insert("age".into(), AttrValue::Int(10));
        ws.update_node("A", updates).unwrap();
        assert_eq!(node_ids(ws.current()), ["B", "D"]);
        assert_eq!(ws.baseline().node("A").unwrap().attr("age"), Some(&AttrValue::Int(10)));
    }

    #[test]
    fn test_edits_work_on_baseline_not_current() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_filter("age>25").unwrap();
        // C is filtered out of the current view but still editable
        let mut updates = Attributes::new();
        updates.insert("name".into(), AttrValue::from("Cee"));
        ws.update_node("C", updates).unwrap();
        assert_eq!(ws.baseline().node("C").unwrap().name, "Cee");
        assert!(!ws.current().contains_node("C"));
    }

    #[test]
    fn test_update_and_delete_unknown_node() {
        let mut ws = Workspace::new(ages_graph());
        let baseline = Arc::clone(ws.baseline());
        assert!(matches!(
            ws.update_node("Z", Attributes::new()).unwrap_err(),
            EngineError::NotFound { kind: "node", .. }
        ));
        assert!(matches!(
            ws.delete_node("Z").unwrap_err(),
            EngineError::NotFound { kind: "node", .. }
        ));
        assert!(Arc::ptr_eq(ws.baseline(), &baseline));
    }

    #[test]
    fn test_create_edge_and_delete_node() {
        let mut ws = Workspace::new(ages_graph());
        let err = ws.create_edge("A", "Z", None).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));

        let graph = ws.create_edge("A", "C", None).unwrap();
        let edge = graph.edges().find(|e| e.source == "A" && e.target == "C").unwrap();
        assert_eq!(edge.kind, DEFAULT_EDGE_TYPE);
        let edge_id = edge.id.clone();

        let graph = ws.delete_node("C").unwrap();
        assert!(graph.edge(&edge_id).is_none());
        assert!(graph.edges().all(|e| !e.touches("C")));
    }

    #[test]
    fn test_delete_edge() {
        let mut ws = Workspace::new(people_graph());
        let graph = ws.delete_edge("e1").unwrap();
        assert!(graph.edge("e1").is_none());
        assert!(matches!(
            ws.delete_edge("e1").unwrap_err(),
            EngineError::NotFound { kind: "edge", .. }
        ));
    }

    #[test]
    fn test_edit_rejected_when_replay_fails() {
        let only = Node::new("x", "x").with_attr("age", 30);
        let mut ws = Workspace::new(Graph::from_parts(false, vec![only], vec![]).unwrap());
        ws.apply_filter("age > 25").unwrap();
        let before = Arc::clone(ws.baseline());

        // deleting the last node carrying `age` would make the recorded filter unparseable
        let err = ws.delete_node("x").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));
        assert!(Arc::ptr_eq(ws.baseline(), &before));
        assert_eq!(ws.queries().len(), 1);
        assert_eq!(node_ids(ws.current()), ["x"]);
    }

    #[test]
    fn test_snapshots_do_not_alias() {
        let mut ws = Workspace::new(ages_graph());
        ws.apply_search("a").unwrap();
        let derived = Arc::clone(ws.current());
        let mut updates = Attributes::new();
        updates.insert("age".into(), AttrValue::Int(99));
        ws.update_node("A", updates).unwrap();
        assert_eq!(derived.node("A").unwrap().attr("age"), Some(&AttrValue::Int(30)));
        assert_eq!(ws.current().node("A").unwrap().attr("age"), Some(&AttrValue::Int(99)));
    }
}

//! Cross-module tests for graphlens-core

use std::collections::HashSet;
use std::sync::Arc;

use crate::test_utils::{ages_graph, node_ids, people_graph};
use crate::*;

/// Every edge of `derived` is an edge of `source` and survives exactly when both endpoints do.
fn assert_induced(source: &Graph, derived: &Graph) {
    let kept: HashSet<&str> = derived.nodes().map(|n| n.id.as_str()).collect();
    let expected: Vec<&Edge> = source
        .edges()
        .filter(|e| kept.contains(e.source.as_str()) && kept.contains(e.target.as_str()))
        .collect();
    let actual: Vec<&Edge> = derived.edges().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_induced_subgraph_law_for_every_query() {
    let graph = people_graph();
    for text in ["a", "o", "novi", "bob", "zzz"] {
        assert_induced(&graph, &search(&graph, text));
    }
    for expr in ["age > 25", "active == true", "joined < 2021-01-01", "city == Belgrade"] {
        assert_induced(&graph, &filter(&graph, expr).unwrap());
    }
}

#[test]
fn test_remove_query_matches_never_applied() {
    let queries = [
        (QueryKind::Filter, "age > 25"),
        (QueryKind::Search, "o"),
        (QueryKind::Filter, "active == true"),
    ];

    for removed in 0..queries.len() {
        let mut full = Workspace::new(people_graph());
        for (kind, value) in queries {
            full.apply(kind, value).unwrap();
        }
        full.remove_query(removed).unwrap();

        let mut fresh = Workspace::new(people_graph());
        for (i, (kind, value)) in queries.into_iter().enumerate() {
            if i != removed {
                fresh.apply(kind, value).unwrap();
            }
        }

        assert_eq!(full.current(), fresh.current(), "removing query {removed}");
        assert_eq!(full.queries(), fresh.queries());
        assert_eq!(full.history().len(), full.queries().len() + 1);
    }
}

#[test]
fn test_history_invariant_across_operations() {
    let mut ws = Workspace::new(ages_graph());
    let check = |ws: &Workspace| {
        assert_eq!(ws.history().len(), ws.queries().len() + 1);
        assert!(Arc::ptr_eq(ws.baseline(), &ws.history()[0]));
    };

    ws.apply_filter("age > 25").unwrap();
    check(&ws);
    ws.apply_search("o").unwrap();
    check(&ws);
    let _ = ws.apply_filter("age > x");
    check(&ws);
    ws.create_node(NewNode::new("D").with_attr("age", 70)).unwrap();
    check(&ws);
    ws.remove_query(0).unwrap();
    check(&ws);
    ws.reset();
    check(&ws);
}

#[test]
fn test_stats_follow_current_view() {
    let mut ws = Workspace::new(ages_graph());
    ws.apply_filter("age >= 30").unwrap();
    let stats = ws.stats();
    assert_eq!(stats.nodes, 2);
    assert_eq!(stats.edges, 1);
    assert_eq!(stats.baseline_nodes, 3);
    assert_eq!(stats.baseline_edges, 2);
    assert_eq!(stats.queries, 1);
}

#[test]
fn test_manager_command_round_trip() {
    let mut manager = WorkspaceManager::new();
    manager.create(people_graph());
    let shared = manager.get_active().unwrap();

    let payloads = [
        serde_json::json!({"command": "filter", "expression": "age >= 30"}),
        serde_json::json!({"command": "create-node", "id": "dave", "age": 50}),
    ];
    let mut ws = shared.lock();
    for payload in payloads {
        command::execute(&mut ws, payload).unwrap();
    }
    assert_eq!(node_ids(ws.current()), ["alice", "bob", "dave"]);
    assert_eq!(ws.current().node("dave").unwrap().name, "dave");
}

#[test]
fn test_diff_between_workspace_snapshots() {
    let mut ws = Workspace::new(ages_graph());
    let before = Arc::clone(ws.current());
    let after = ws.apply_filter("age > 25").unwrap();

    let mut engine = DiffEngine::new();
    let diff = engine.compute_diff(&before, &after);
    assert_eq!(diff.removed_nodes, ["C"]);
    assert_eq!(diff.removed_edges, ["bc"]);
    assert!(diff.added_nodes.is_empty());
}

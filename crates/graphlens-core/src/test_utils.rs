//! Shared graph fixtures for graphlens-core tests

use chrono::NaiveDate;

use crate::graph::Graph;
use crate::model::{Edge, Node};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Three people with every scalar attribute type, in a directed cycle.
pub fn people_graph() -> Graph {
    Graph::from_parts(
        true,
        vec![
            Node::new("alice", "Alice")
                .with_attr("age", 30)
                .with_attr("city", "Novi Sad")
                .with_attr("active", true)
                .with_attr("joined", date(2019, 5, 1)),
            Node::new("bob", "Bob")
                .with_attr("age", 40)
                .with_attr("city", "Belgrade")
                .with_attr("active", false)
                .with_attr("joined", date(2020, 3, 15))
                .with_attr("nickname", "bobby"),
            Node::new("carol", "Carol")
                .with_attr("age", 20)
                .with_attr("city", "Novi Sad")
                .with_attr("active", true)
                .with_attr("joined", date(2021, 7, 30)),
        ],
        vec![
            Edge::with_id("e1", "alice", "bob", "knows", true),
            Edge::with_id("e2", "bob", "carol", "knows", true),
            Edge::with_id("e3", "carol", "alice", "knows", true),
        ],
    )
    .unwrap()
}

/// Baseline `{A(age=30), B(age=40), C(age=20)}` in an undirected chain.
pub fn ages_graph() -> Graph {
    Graph::from_parts(
        false,
        vec![
            Node::new("A", "Ann").with_attr("age", 30),
            Node::new("B", "Bob").with_attr("age", 40),
            Node::new("C", "Cid").with_attr("age", 20),
        ],
        vec![
            Edge::with_id("ab", "A", "B", "knows", false),
            Edge::with_id("bc", "B", "C", "knows", false),
        ],
    )
    .unwrap()
}

/// Node ids in iteration order.
pub fn node_ids(graph: &Graph) -> Vec<&str> {
    graph.nodes().map(|n| n.id.as_str()).collect()
}

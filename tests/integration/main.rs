//! Integration tests for GraphLens
//!
//! These tests verify that multiple systems work together correctly.

use std::process::Command;
use std::sync::Arc;

use graphlens_core::{command, Capabilities, GraphView, RenderContext, WorkspaceManager};
use serde_json::json;
use tempfile::TempDir;

const SOCIAL: &str = r#"{"nodes": [
    {"id": "u1", "name": "Mila", "age": 34, "since": "2018-04-01", "follows": ["u2", "u3"]},
    {"id": "u2", "name": "Nikola", "age": 27, "since": "2020-09-12", "follows": ["u1"], "likes": ["u3"]},
    {"id": "u3", "name": "Jovana", "age": 41, "since": "2016-01-20"}
]}"#;

fn write_social(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("social_dataset.json");
    std::fs::write(&path, SOCIAL).unwrap();
    path
}

fn capabilities() -> Capabilities {
    let mut caps = Capabilities::new();
    graphlens_loaders::register_loaders(&mut caps, &graphlens_loaders::builtin_presets()).unwrap();
    graphlens_render::register_renderers(&mut caps).unwrap();
    caps
}

/// Loader -> manager -> commands -> renderer, the way the server drives them.
#[test]
fn test_load_query_edit_render() {
    let dir = TempDir::new().unwrap();
    let caps = Arc::new(capabilities());
    let graph = caps.load("social-json", &write_social(&dir)).unwrap();
    assert_eq!(graph.edge_count(), 4);

    let mut manager = WorkspaceManager::new();
    manager.create(graph);
    let shared = manager.get_active().unwrap();
    let mut ws = shared.lock();

    command::execute(&mut ws, json!({"command": "filter", "expression": "since < 2019-01-01"})).unwrap();
    let current = command::execute(&mut ws, json!({"command": "search", "query": "a"})).unwrap();
    let view = GraphView::from(current.as_ref());
    let ids: Vec<_> = view.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u3"]);
    assert_eq!(view.edges.len(), 1);

    // editing the baseline replays both queries
    let current = command::execute(
        &mut ws,
        json!({"command": "create-node", "id": "u4", "label": "Ana", "since": "2010-05-05"}),
    )
    .unwrap();
    assert!(current.contains_node("u4"));

    command::execute(&mut ws, json!({"command": "remove-query", "index": 0})).unwrap();
    assert_eq!(ws.queries().len(), 1);

    let svg = caps
        .render(ws.current(), 640, 480, &RenderContext::with_visualizer("block"))
        .unwrap();
    assert!(svg.contains("Jovana"));
    assert!(svg.contains(r#"class="block-rect""#));
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_graphlens"))
        .arg("version")
        .output()
        .expect("Failed to execute graphlens");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("GraphLens v"));
}

#[test]
fn test_cli_show_prints_filtered_graph() {
    let dir = TempDir::new().unwrap();
    let path = write_social(&dir);
    let output = Command::new(env!("CARGO_BIN_EXE_graphlens"))
        .current_dir(dir.path())
        .args(["show", "social-json"])
        .arg(&path)
        .args(["--filter", "age > 30"])
        .output()
        .expect("Failed to execute graphlens");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let view: GraphView = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<_> = view.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["u1", "u3"]);
    assert_eq!(view.edges.len(), 1);
}

#[test]
fn test_cli_reports_filter_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_social(&dir);
    let output = Command::new(env!("CARGO_BIN_EXE_graphlens"))
        .current_dir(dir.path())
        .args(["show", "social-json"])
        .arg(&path)
        .args(["--filter", "age > old"])
        .output()
        .expect("Failed to execute graphlens");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot compare 'age'"));
}

#[test]
fn test_cli_renders_xml_overview() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("city.xml");
    std::fs::write(
        &path,
        r#"<city type="directed">
            <intersection><x>0</x><y>0</y><lanes>4</lanes><reference>/city/intersection[2]</reference></intersection>
            <intersection><x>100</x><y>50</y><lanes>2</lanes></intersection>
        </city>"#,
    )
    .unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_graphlens"))
        .current_dir(dir.path())
        .args(["render", "xml-loader"])
        .arg(&path)
        .args(["--visualizer", "bird", "--width", "200", "--height", "100"])
        .args(["--filter", "lanes > 1"])
        .output()
        .expect("Failed to execute graphlens");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let svg = String::from_utf8_lossy(&output.stdout);
    assert!(svg.contains(r#"class="bird-svg""#));
    // the city root has no lanes, so only the two intersections survive
    assert_eq!(svg.matches("<circle").count(), 2);
    assert_eq!(svg.matches("<line").count(), 1);
}

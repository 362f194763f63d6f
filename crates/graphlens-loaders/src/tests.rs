//! File-backed tests for the JSON loaders

use std::fs;

use graphlens_core::{AttrValue, Capabilities, DataSource};
use tempfile::TempDir;

use crate::{builtin_presets, register_loaders, JsonDataSource, JsonLoaderConfig, XmlDataSource, XML_LOADER_ID};

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_people_preset_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "people_dataset.json",
        r#"{
            "alice": {"name": "Alice", "age": 30, "joined": "2019-05-01", "knows": ["bob"]},
            "bob": {"name": "Bob", "age": 40, "knows": ["alice", "alice"]}
        }"#,
    );

    let mut caps = Capabilities::new();
    register_loaders(&mut caps, &builtin_presets()).unwrap();
    let graph = caps.load("people-json", &path).unwrap();

    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 2);
    assert!(matches!(
        graph.node("alice").unwrap().attr("joined"),
        Some(AttrValue::Date(_))
    ));
    let edge = graph.edge("alice:knows:bob").unwrap();
    assert_eq!(edge.kind, "knows");
}

#[test]
fn test_project_preset_uses_at_id() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "project_dataset.json",
        r#"{"nodes": [
            {"@id": "p1", "name": "Engine", "contributors": ["u1"]},
            {"@id": "u1", "name": "Uma", "projects": ["p1"]}
        ]}"#,
    );
    let source = JsonDataSource::new(
        builtin_presets()
            .into_iter()
            .find(|c| c.loader_id == "project-data-loader")
            .unwrap(),
    );
    let graph = source.load(&path).unwrap();
    let kinds: Vec<_> = graph.edges().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, ["has_contributor", "contributes_to"]);
    assert_eq!(source.name(), "Project Data Loader");
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let source = JsonDataSource::new(JsonLoaderConfig::new("x", "X"));
    let err = source.load(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}

#[test]
fn test_malformed_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{\"a\": {\"name\": ");
    let source = JsonDataSource::new(JsonLoaderConfig::new("x", "X"));
    let err = source.load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to parse"));
}

#[test]
fn test_configured_loader_overrides_preset() {
    let mut caps = Capabilities::new();
    register_loaders(&mut caps, &builtin_presets()).unwrap();
    let custom = JsonLoaderConfig::new("people-json", "My People");
    register_loaders(&mut caps, &[custom]).unwrap();

    // four presets plus the XML loader
    assert_eq!(caps.loaders.len(), 5);
    assert_eq!(caps.loaders.get("people-json").unwrap().name(), "My People");
    assert_eq!(caps.loaders.list().last().map(String::as_str), Some(XML_LOADER_ID));
}

#[test]
fn test_xml_loader_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "city_intersections.xml",
        r#"<city type="directed">
            <intersection><street>Bulevar</street><reference>/city/intersection[2]</reference></intersection>
            <intersection><street>Futoska</street></intersection>
        </city>"#,
    );

    let mut caps = Capabilities::new();
    register_loaders(&mut caps, &builtin_presets()).unwrap();
    let graph = caps.load(XML_LOADER_ID, &path).unwrap();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(
        graph.node("/city/intersection[2]").unwrap().attr("street"),
        Some(&AttrValue::Str("Futoska".to_string()))
    );
    assert_eq!(caps.loaders.get(XML_LOADER_ID).unwrap().name(), "XML Loader");
}

#[test]
fn test_malformed_xml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.xml", "<city><intersection></city>");
    let err = XmlDataSource::new().load(&path).unwrap_err();
    assert!(err.to_string().starts_with("Failed to load"));
    assert!(format!("{err:#}").contains("malformed XML"));

    let err = XmlDataSource::new().load(&dir.path().join("absent.xml")).unwrap_err();
    assert!(err.to_string().starts_with("Failed to read"));
}

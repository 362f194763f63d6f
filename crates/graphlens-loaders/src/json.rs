//! Configurable JSON data source

use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use graphlens_core::{AttrValue, Attributes, DataSource, Edge, Graph, Node};
use serde_json::{Map, Value};

use crate::config::JsonLoaderConfig;

/// Loads graphs from JSON documents shaped as described by a [`JsonLoaderConfig`].
#[derive(Debug, Clone)]
pub struct JsonDataSource {
    config: JsonLoaderConfig,
}

impl JsonDataSource {
    pub fn new(config: JsonLoaderConfig) -> Self {
        JsonDataSource { config }
    }

    pub fn config(&self) -> &JsonLoaderConfig {
        &self.config
    }

    /// Build a graph from an already parsed document.
    pub fn build(&self, document: &Value) -> Result<Graph> {
        let records = self.records(document)?;
        let mut graph = Graph::new(self.config.is_directed);

        for (id, fields) in &records {
            graph.add_node(self.node(id, fields)?)?;
        }

        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        for (source, fields) in &records {
            for (key, kind) in &self.config.edge_keys {
                let Some(value) = fields.get(key) else {
                    continue;
                };
                for target in target_ids(value) {
                    if !graph.contains_node(&target) {
                        tracing::debug!("Skipping '{}' edge {} -> {}: no such node", kind, source, target);
                        continue;
                    }
                    let (a, b) = if self.config.is_directed || *source <= target {
                        (source.clone(), target.clone())
                    } else {
                        (target.clone(), source.clone())
                    };
                    if !seen.insert((a, b, kind.clone())) {
                        continue;
                    }
                    let id = format!("{source}:{kind}:{target}");
                    graph.add_edge(Edge::with_id(id, source.as_str(), target, kind.as_str(), self.config.is_directed))?;
                }
            }
        }

        Ok(graph)
    }

    /// Pair each node record with its id, in document order.
    fn records<'a>(&self, document: &'a Value) -> Result<Vec<(String, &'a Map<String, Value>)>> {
        let Some(path) = &self.config.nodes_path else {
            let root = document
                .as_object()
                .ok_or_else(|| anyhow!("expected a JSON object mapping node ids to attributes"))?;
            return root
                .iter()
                .map(|(id, fields)| -> Result<(String, &'a Map<String, Value>)> {
                    let fields = fields
                        .as_object()
                        .ok_or_else(|| anyhow!("node '{id}' must be a JSON object"))?;
                    Ok((id.clone(), fields))
                })
                .collect();
        };

        let mut cursor = document;
        for key in path {
            cursor = cursor
                .get(key)
                .ok_or_else(|| anyhow!("nodes path: key '{key}' not found"))?;
        }
        let items = cursor
            .as_array()
            .ok_or_else(|| anyhow!("nodes path '{}' must lead to an array", path.join(".")))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| -> Result<(String, &'a Map<String, Value>)> {
                let fields = item
                    .as_object()
                    .ok_or_else(|| anyhow!("node #{i} must be a JSON object"))?;
                let id = fields
                    .get(&self.config.node_id_key)
                    .and_then(scalar_id)
                    .ok_or_else(|| anyhow!("node #{i} has no '{}' id", self.config.node_id_key))?;
                Ok((id, fields))
            })
            .collect()
    }

    fn node(&self, id: &str, fields: &Map<String, Value>) -> Result<Node> {
        let name = fields
            .get(&self.config.node_name_key)
            .and_then(scalar_id)
            .unwrap_or_else(|| id.to_string());
        let mut attributes = Attributes::new();
        for (key, value) in fields {
            if self.config.edge_keys.contains_key(key) {
                continue;
            }
            let value: AttrValue = serde_json::from_value(value.clone())
                .with_context(|| format!("node '{id}': unsupported value for '{key}'"))?;
            attributes.insert(key.clone(), value);
        }
        let mut node = Node::new(id, name);
        node.attributes = attributes;
        Ok(node)
    }
}

/// Strings are used as-is; numbers and booleans by their JSON text.
fn scalar_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A single target id or a list of them.
fn target_ids(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_id).collect(),
        other => scalar_id(other).into_iter().collect(),
    }
}

impl DataSource for JsonDataSource {
    fn id(&self) -> &str {
        &self.config.loader_id
    }

    fn name(&self) -> &str {
        &self.config.loader_name
    }

    fn load(&self, path: &Path) -> Result<Graph> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document: Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
        let graph = self
            .build(&document)
            .with_context(|| format!("Failed to load {} with '{}'", path.display(), self.config.loader_id))?;
        tracing::info!(
            "Loaded {} ({} nodes, {} edges) with {}",
            path.display(),
            graph.node_count(),
            graph.edge_count(),
            self.config.loader_id
        );
        Ok(graph)
    }
}

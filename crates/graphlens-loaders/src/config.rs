//! JSON loader configuration and the built-in dataset presets

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

fn default_id_key() -> String {
    "id".to_string()
}

fn default_name_key() -> String {
    "name".to_string()
}

fn default_directed() -> bool {
    true
}

/// Describes how one JSON document shape maps onto a graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonLoaderConfig {
    pub loader_id: String,
    pub loader_name: String,
    /// File the dataset is usually shipped as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Object keys leading to the node array. When absent the document root
    /// maps node ids to attribute objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes_path: Option<Vec<String>>,
    #[serde(default = "default_id_key")]
    pub node_id_key: String,
    #[serde(default = "default_name_key")]
    pub node_name_key: String,
    /// Attribute holding target id(s) -> edge type.
    #[serde(default)]
    pub edge_keys: IndexMap<String, String>,
    #[serde(default = "default_directed")]
    pub is_directed: bool,
}

impl JsonLoaderConfig {
    pub fn new(loader_id: impl Into<String>, loader_name: impl Into<String>) -> Self {
        JsonLoaderConfig {
            loader_id: loader_id.into(),
            loader_name: loader_name.into(),
            file_name: None,
            nodes_path: None,
            node_id_key: default_id_key(),
            node_name_key: default_name_key(),
            edge_keys: IndexMap::new(),
            is_directed: true,
        }
    }

    pub fn file_name(mut self, file_name: &str) -> Self {
        self.file_name = Some(file_name.to_string());
        self
    }

    pub fn nodes_path(mut self, path: &[&str]) -> Self {
        self.nodes_path = Some(path.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn node_id_key(mut self, key: &str) -> Self {
        self.node_id_key = key.to_string();
        self
    }

    pub fn edge_key(mut self, attribute: &str, edge_type: &str) -> Self {
        self.edge_keys.insert(attribute.to_string(), edge_type.to_string());
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.is_directed = directed;
        self
    }
}

/// Loaders registered when no datasets are configured.
pub fn builtin_presets() -> Vec<JsonLoaderConfig> {
    vec![
        JsonLoaderConfig::new("people-json", "People JSON Loader")
            .file_name("people_dataset.json")
            .edge_key("knows", "knows"),
        JsonLoaderConfig::new("network-json", "Network JSON Loader")
            .file_name("network_dataset.json")
            .nodes_path(&["nodes"])
            .node_id_key("@id")
            .edge_key("connected", "connects")
            .directed(false),
        JsonLoaderConfig::new("social-json", "Social Network Loader")
            .file_name("social_dataset.json")
            .nodes_path(&["nodes"])
            .edge_key("follows", "follows")
            .edge_key("likes", "likes"),
        JsonLoaderConfig::new("project-data-loader", "Project Data Loader")
            .file_name("project_dataset.json")
            .nodes_path(&["nodes"])
            .node_id_key("@id")
            .edge_key("contributors", "has_contributor")
            .edge_key("projects", "contributes_to"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_partial_config() {
        let config: JsonLoaderConfig = serde_json::from_value(serde_json::json!({
            "loader_id": "custom",
            "loader_name": "Custom",
            "edge_keys": {"parent": "child_of"}
        }))
        .unwrap();
        assert_eq!(config.node_id_key, "id");
        assert_eq!(config.node_name_key, "name");
        assert!(config.nodes_path.is_none());
        assert!(config.is_directed);
        assert_eq!(config.edge_keys["parent"], "child_of");
    }

    #[test]
    fn test_presets_have_unique_ids() {
        let presets = builtin_presets();
        let ids: Vec<_> = presets.iter().map(|p| p.loader_id.as_str()).collect();
        assert_eq!(ids, ["people-json", "network-json", "social-json", "project-data-loader"]);
        assert!(!presets[1].is_directed);
    }
}

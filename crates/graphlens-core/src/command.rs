//! Command surface mapping transport payloads onto workspace operations

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::model::{Attributes, Edge, Node};
use crate::workspace::{NewNode, Workspace};

/// One graph command, tagged by its `command` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum Command {
    CreateNode(NewNode),
    UpdateNode {
        id: String,
        #[serde(default)]
        updates: Attributes,
    },
    DeleteNode {
        id: String,
    },
    CreateEdge {
        from: String,
        to: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
    DeleteEdge {
        id: String,
    },
    Filter {
        expression: String,
    },
    Search {
        query: String,
    },
    Reset {},
    RemoveQuery {
        index: usize,
    },
}

impl Command {
    /// Decode a raw payload. Unknown commands and missing fields are validation errors.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| EngineError::validation(format!("invalid command: {e}")))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateNode(_) => "create-node",
            Command::UpdateNode { .. } => "update-node",
            Command::DeleteNode { .. } => "delete-node",
            Command::CreateEdge { .. } => "create-edge",
            Command::DeleteEdge { .. } => "delete-edge",
            Command::Filter { .. } => "filter",
            Command::Search { .. } => "search",
            Command::Reset {} => "reset",
            Command::RemoveQuery { .. } => "remove-query",
        }
    }

    /// Run against `workspace` and return its new current snapshot.
    pub fn execute(self, workspace: &mut Workspace) -> Result<Arc<Graph>> {
        match self {
            Command::CreateNode(data) => workspace.create_node(data),
            Command::UpdateNode { id, updates } => workspace.update_node(&id, updates),
            Command::DeleteNode { id } => workspace.delete_node(&id),
            Command::CreateEdge { from, to, kind } => {
                workspace.create_edge(&from, &to, kind.as_deref())
            }
            Command::DeleteEdge { id } => workspace.delete_edge(&id),
            Command::Filter { expression } => workspace.apply_filter(&expression),
            Command::Search { query } => workspace.apply_search(&query),
            Command::Reset {} => Ok(workspace.reset()),
            Command::RemoveQuery { index } => workspace.remove_query(index),
        }
    }
}

/// Decode and run a raw payload in one step.
pub fn execute(workspace: &mut Workspace, payload: serde_json::Value) -> Result<Arc<Graph>> {
    Command::from_value(payload)?.execute(workspace)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub name: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeView {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Serialized form of a graph as returned to command callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        NodeView {
            id: node.id.clone(),
            name: node.name.clone(),
            attributes: node.attributes.clone(),
        }
    }
}

impl From<&Edge> for EdgeView {
    fn from(edge: &Edge) -> Self {
        EdgeView {
            id: edge.id.clone(),
            from: edge.source.clone(),
            to: edge.target.clone(),
            kind: edge.kind.clone(),
        }
    }
}

impl From<&Graph> for GraphView {
    fn from(graph: &Graph) -> Self {
        GraphView {
            nodes: graph.nodes().map(NodeView::from).collect(),
            edges: graph.edges().map(EdgeView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorResponse {
            error: message.into(),
        }
    }
}

impl From<&EngineError> for ErrorResponse {
    fn from(err: &EngineError) -> Self {
        ErrorResponse::new(err.to_string())
    }
}

/// Either the new current graph or an error message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Graph(GraphView),
    Error(ErrorResponse),
}

impl From<Result<Arc<Graph>>> for CommandResponse {
    fn from(result: Result<Arc<Graph>>) -> Self {
        match result {
            Ok(graph) => CommandResponse::Graph(GraphView::from(graph.as_ref())),
            Err(err) => CommandResponse::Error(ErrorResponse::from(&err)),
        }
    }
}

//! GraphLens Core: graph model, query engine, workspaces and plugin registries

pub mod error;
pub mod model;
pub mod graph;
pub mod query;
pub mod workspace;
pub mod manager;
pub mod plugin;
pub mod registry;
pub mod command;
pub mod diff;

#[cfg(test)]
pub mod tests;

#[cfg(test)]
pub mod test_utils;

pub use error::{EngineError, Result};
pub use model::{AttrValue, Attributes, Edge, Node, DEFAULT_EDGE_TYPE};
pub use graph::Graph;
pub use query::{filter, search, CompareOp, FilterExpr};
pub use workspace::{NewNode, Query, QueryKind, Workspace, WorkspaceStats};
pub use manager::{SharedWorkspace, WorkspaceManager};
pub use plugin::{DataSource, RenderContext, Renderer, Viewport};
pub use registry::{Capabilities, Registry, DEFAULT_RENDERER};
pub use command::{Command, CommandResponse, EdgeView, ErrorResponse, GraphView, NodeView};
pub use diff::{DiffEngine, GraphDiff};

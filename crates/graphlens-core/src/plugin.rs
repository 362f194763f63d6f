//! Contracts for interchangeable data sources and renderers

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// Visible rectangle in graph coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Per-call hints passed to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderContext {
    /// Node id to `[x, y]` overrides of the renderer's own placement.
    pub positions: HashMap<String, [f64; 2]>,
    pub viewport: Option<Viewport>,
    /// Renderer variant, e.g. `simple` or `block`.
    pub visualizer: Option<String>,
}

impl RenderContext {
    pub fn with_visualizer(visualizer: impl Into<String>) -> Self {
        RenderContext {
            visualizer: Some(visualizer.into()),
            ..Default::default()
        }
    }

    pub fn position(&self, node_id: &str) -> Option<(f64, f64)> {
        self.positions.get(node_id).map(|&[x, y]| (x, y))
    }
}

/// Turns a graph snapshot into markup.
///
/// Renderers only ever see immutable snapshots, so a failing renderer cannot
/// disturb workspace state.
pub trait Renderer: Send + Sync {
    fn render(&self, graph: &Graph, width: u32, height: u32, ctx: &RenderContext) -> Result<String>;
}

/// Produces a baseline graph from a file.
///
/// Implementations fail with an error instead of returning a partial graph.
pub trait DataSource: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn load(&self, path: &Path) -> Result<Graph>;
}

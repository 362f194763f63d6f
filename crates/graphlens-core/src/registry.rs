//! Keyed registries of renderer and data-source providers

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::plugin::{DataSource, RenderContext, Renderer};

/// Renderer used when a render context names no visualizer.
pub const DEFAULT_RENDERER: &str = "simple";

/// A mapping from non-empty keys to shared providers.
///
/// Populated during startup, then read without locking.
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: IndexMap<String, Arc<T>>,
}

impl<T: ?Sized> Registry<T> {
    /// `kind` names the provider type in NotFound errors.
    pub fn new(kind: &'static str) -> Self {
        Registry {
            kind,
            entries: IndexMap::new(),
        }
    }

    /// Store `provider` under `key`. Re-registering a key replaces the old
    /// provider but keeps its position in [`Registry::list`].
    pub fn register(&mut self, key: impl Into<String>, provider: Arc<T>) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(EngineError::validation(format!(
                "{} key must not be empty",
                self.kind
            )));
        }
        tracing::debug!("Registered {} '{}'", self.kind, key);
        self.entries.insert(key, provider);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Arc<T>> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::not_found(self.kind, key))
    }

    pub fn list(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Both plugin registries, built once and then shared.
pub struct Capabilities {
    pub renderers: Registry<dyn Renderer>,
    pub loaders: Registry<dyn DataSource>,
    default_renderer: String,
}

impl Capabilities {
    pub fn new() -> Self {
        Capabilities {
            renderers: Registry::new("renderer"),
            loaders: Registry::new("loader"),
            default_renderer: DEFAULT_RENDERER.to_string(),
        }
    }

    pub fn with_default_renderer(mut self, key: impl Into<String>) -> Self {
        self.default_renderer = key.into();
        self
    }

    pub fn default_renderer(&self) -> &str {
        &self.default_renderer
    }

    /// Load a baseline graph with the loader registered as `loader`.
    pub fn load(&self, loader: &str, path: &std::path::Path) -> anyhow::Result<Graph> {
        let source = self.loaders.get(loader)?;
        source.load(path)
    }

    /// Render with the visualizer named in `ctx`, or the default renderer.
    pub fn render(
        &self,
        graph: &Graph,
        width: u32,
        height: u32,
        ctx: &RenderContext,
    ) -> anyhow::Result<String> {
        let key = ctx
            .visualizer
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(self.default_renderer.as_str());
        let renderer = self.renderers.get(key)?;
        renderer.render(graph, width, height, ctx)
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new()
    }
}

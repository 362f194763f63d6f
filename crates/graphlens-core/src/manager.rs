//! Keyed set of workspaces with a single active entry

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::error::{EngineError, Result};
use crate::graph::Graph;
use crate::workspace::Workspace;

/// A workspace that can be locked independently of every other workspace.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

/// Owns the open workspaces, keyed `workspace1`, `workspace2`, ...
///
/// Once a workspace exists exactly one key is active, and the last
/// remaining workspace can never be closed.
#[derive(Debug, Default)]
pub struct WorkspaceManager {
    workspaces: IndexMap<String, SharedWorkspace>,
    active: Option<String>,
    counter: u64,
}

impl WorkspaceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `graph` in a new workspace, make it active and return its key.
    pub fn create(&mut self, graph: Graph) -> String {
        self.counter += 1;
        let key = format!("workspace{}", self.counter);
        tracing::info!(
            "Created {} ({} nodes, {} edges)",
            key,
            graph.node_count(),
            graph.edge_count()
        );
        self.workspaces
            .insert(key.clone(), Arc::new(Mutex::new(Workspace::new(graph))));
        self.active = Some(key.clone());
        key
    }

    /// Close `key`. Refused when it is unknown or the last remaining workspace.
    pub fn close(&mut self, key: &str) -> bool {
        if self.workspaces.len() <= 1 || self.workspaces.shift_remove(key).is_none() {
            return false;
        }
        if self.active.as_deref() == Some(key) {
            self.active = self.workspaces.keys().next().cloned();
        }
        tracing::info!("Closed {}", key);
        true
    }

    /// Activate `key` if it exists.
    pub fn switch(&mut self, key: &str) -> bool {
        if !self.workspaces.contains_key(key) {
            return false;
        }
        self.active = Some(key.to_string());
        true
    }

    pub fn get_active(&self) -> Option<SharedWorkspace> {
        self.active
            .as_ref()
            .and_then(|key| self.workspaces.get(key))
            .cloned()
    }

    pub fn active_key(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, key: &str) -> Result<SharedWorkspace> {
        self.workspaces
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::not_found("workspace", key))
    }

    /// Keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.workspaces.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}

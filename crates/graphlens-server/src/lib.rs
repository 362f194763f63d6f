//! HTTP + WebSocket server

pub mod error;
pub mod handlers;
pub mod router;
pub mod websocket;


use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use graphlens_core::{Capabilities, DiffEngine, EngineError, Graph, GraphView, SharedWorkspace, WorkspaceManager};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

use crate::websocket::WsMessage;

pub use error::ApiError;
pub use router::create_router;

/// Default canvas size for render requests that do not name one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            width: 900,
            height: 600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// State shared by every handler.
///
/// The manager lock only guards workspace creation, switching and closing.
/// Each workspace carries its own lock, which is never held across an await.
pub struct ServerState {
    pub manager: RwLock<WorkspaceManager>,
    pub capabilities: Arc<Capabilities>,
    pub render: RenderSettings,
    pub diff_tx: broadcast::Sender<String>,
    /// Root that every client-supplied data path must stay inside.
    data_dir: PathBuf,
    diffs: parking_lot::Mutex<DiffEngine>,
}

impl ServerState {
    pub fn new(capabilities: Arc<Capabilities>, render: RenderSettings) -> Self {
        let (diff_tx, _) = broadcast::channel(256);
        ServerState {
            manager: RwLock::new(WorkspaceManager::new()),
            capabilities,
            render,
            diff_tx,
            data_dir: PathBuf::from("."),
            diffs: parking_lot::Mutex::new(DiffEngine::new()),
        }
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Resolve a client-supplied path against the data directory.
    ///
    /// Only plain relative paths are accepted, and the resolved file must
    /// still lie under the data directory once symlinks are followed.
    pub fn resolve_data_path(&self, requested: &Path) -> Result<PathBuf, EngineError> {
        let plain = requested
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if requested.as_os_str().is_empty() || !plain {
            return Err(EngineError::validation(format!(
                "data path must be relative to the data directory: {}",
                requested.display()
            )));
        }
        let root = self
            .data_dir
            .canonicalize()
            .map_err(|_| EngineError::not_found("data directory", self.data_dir.display().to_string()))?;
        let resolved = root
            .join(requested)
            .canonicalize()
            .map_err(|_| EngineError::not_found("data file", requested.display().to_string()))?;
        if !resolved.starts_with(&root) {
            return Err(EngineError::validation(format!(
                "data path leaves the data directory: {}",
                requested.display()
            )));
        }
        Ok(resolved)
    }

    /// The active workspace, or NotFound when none has been created.
    pub async fn active_workspace(&self) -> Result<SharedWorkspace, EngineError> {
        self.manager
            .read()
            .await
            .get_active()
            .ok_or_else(|| EngineError::not_found("workspace", "active"))
    }

    /// Send a raw message to every connected WebSocket client.
    pub fn broadcast(&self, msg: String) -> Result<usize, broadcast::error::SendError<String>> {
        self.diff_tx.send(msg)
    }

    pub fn sequence(&self) -> u64 {
        self.diffs.lock().sequence()
    }

    /// Broadcast what changed between two snapshots of the active workspace.
    pub fn publish_diff(&self, old: &Graph, new: &Graph) {
        let diff = self.diffs.lock().compute_diff(old, new);
        if diff.is_empty() {
            return;
        }
        self.send(&WsMessage::GraphDiff { diff });
    }

    /// Broadcast a whole snapshot, e.g. after the active workspace changed.
    pub fn publish_full(&self, graph: &Graph) {
        let sequence = self.sequence();
        self.send(&WsMessage::FullGraph {
            graph: GraphView::from(graph),
            sequence,
        });
    }

    fn send(&self, msg: &WsMessage) {
        match serde_json::to_string(msg) {
            // no subscribers is not an error
            Ok(json) => {
                let _ = self.broadcast(json);
            }
            Err(e) => tracing::warn!("Failed to serialize WebSocket message: {}", e),
        }
    }
}

/// Server wrapper that owns configuration and shared state.
pub struct GraphLensServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl GraphLensServer {
    pub fn new(state: ServerState, config: ServerConfig) -> Self {
        GraphLensServer {
            state: Arc::new(state),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    pub async fn start(self) -> anyhow::Result<()> {
        let addr = self.address();
        let app = create_router(self.state());
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("GraphLens server listening on http://{}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

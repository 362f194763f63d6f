//! REST API handlers for the GraphLens server

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
};
use graphlens_core::{Command, DataSource, EngineError, GraphView, Query, RenderContext, WorkspaceStats};
use graphlens_render::{escape, OVERVIEW_HEIGHT, OVERVIEW_WIDTH};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ServerState};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct LoaderInfo {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct PluginsResponse {
    pub renderers: Vec<String>,
    pub default_renderer: String,
    pub loaders: Vec<LoaderInfo>,
}

#[derive(Debug, Serialize)]
pub struct WorkspaceSummary {
    pub key: String,
    pub active: bool,
    pub stats: WorkspaceStats,
}

#[derive(Debug, Serialize)]
pub struct WorkspacesResponse {
    pub active: Option<String>,
    pub workspaces: Vec<WorkspaceSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub loader: String,
    pub path: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct CreateWorkspaceResponse {
    pub key: String,
    pub stats: WorkspaceStats,
}

#[derive(Debug, Serialize)]
pub struct CloseWorkspaceResponse {
    pub closed: bool,
    pub active: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueriesResponse {
    pub queries: Vec<Query>,
    pub stats: WorkspaceStats,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub context: RenderContext,
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Registered renderers and loaders
pub async fn list_plugins(State(state): State<Arc<ServerState>>) -> Json<PluginsResponse> {
    let caps = &state.capabilities;
    let loaders = caps
        .loaders
        .list()
        .into_iter()
        .filter_map(|key| {
            let loader = caps.loaders.get(&key).ok()?;
            Some(LoaderInfo {
                id: loader.id().to_string(),
                name: loader.name().to_string(),
            })
        })
        .collect();
    Json(PluginsResponse {
        renderers: caps.renderers.list(),
        default_renderer: caps.default_renderer().to_string(),
        loaders,
    })
}

pub async fn list_workspaces(State(state): State<Arc<ServerState>>) -> Json<WorkspacesResponse> {
    let manager = state.manager.read().await;
    let active = manager.active_key().map(str::to_string);
    let workspaces = manager
        .keys()
        .filter_map(|key| {
            let ws = manager.get(key).ok()?;
            let stats = ws.lock().stats();
            Some(WorkspaceSummary {
                key: key.to_string(),
                active: active.as_deref() == Some(key),
                stats,
            })
        })
        .collect();
    Json(WorkspacesResponse { active, workspaces })
}

/// Load a baseline graph and open it as the new active workspace.
///
/// `path` is resolved inside the server's data directory.
pub async fn create_workspace(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateWorkspaceRequest>,
) -> Result<Json<CreateWorkspaceResponse>, ApiError> {
    state.capabilities.loaders.get(&request.loader)?;
    let path = state.resolve_data_path(&request.path)?;
    let graph = state
        .capabilities
        .load(&request.loader, &path)
        .map_err(|e| ApiError::plugin(e, StatusCode::UNPROCESSABLE_ENTITY))?;

    let (key, stats) = {
        let mut manager = state.manager.write().await;
        let key = manager.create(graph);
        let ws = manager.get(&key)?;
        let stats = ws.lock().stats();
        (key, stats)
    };
    publish_active(&state).await;
    Ok(Json(CreateWorkspaceResponse { key, stats }))
}

pub async fn activate_workspace(
    State(state): State<Arc<ServerState>>,
    Path(key): Path<String>,
) -> Result<Json<WorkspacesResponse>, ApiError> {
    if !state.manager.write().await.switch(&key) {
        return Err(EngineError::not_found("workspace", key).into());
    }
    tracing::info!("Activated {}", key);
    publish_active(&state).await;
    Ok(list_workspaces(State(state)).await)
}

/// Close a workspace. Closing the last one is refused and reported as `closed: false`.
pub async fn close_workspace(
    State(state): State<Arc<ServerState>>,
    Path(key): Path<String>,
) -> Result<Json<CloseWorkspaceResponse>, ApiError> {
    let (closed, active_changed, active) = {
        let mut manager = state.manager.write().await;
        manager.get(&key)?;
        let was_active = manager.active_key() == Some(key.as_str());
        let closed = manager.close(&key);
        (closed, closed && was_active, manager.active_key().map(str::to_string))
    };
    if active_changed {
        publish_active(&state).await;
    }
    Ok(Json(CloseWorkspaceResponse { closed, active }))
}

/// Get the active workspace's current graph
pub async fn get_graph(State(state): State<Arc<ServerState>>) -> Result<Json<GraphView>, ApiError> {
    let ws = state.active_workspace().await?;
    let current = Arc::clone(ws.lock().current());
    Ok(Json(GraphView::from(current.as_ref())))
}

pub async fn get_queries(State(state): State<Arc<ServerState>>) -> Result<Json<QueriesResponse>, ApiError> {
    let ws = state.active_workspace().await?;
    let guard = ws.lock();
    Ok(Json(QueriesResponse {
        queries: guard.queries().to_vec(),
        stats: guard.stats(),
    }))
}

/// Run one graph command against the active workspace
pub async fn graph_command(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<GraphView>, ApiError> {
    let command = Command::from_value(payload)?;
    let name = command.name();
    let ws = state.active_workspace().await?;
    let (old, new) = {
        let mut guard = ws.lock();
        let old = Arc::clone(guard.current());
        let new = command.execute(&mut guard)?;
        (old, new)
    };
    tracing::debug!("Command {} -> {} nodes", name, new.node_count());
    state.publish_diff(&old, &new);
    Ok(Json(GraphView::from(new.as_ref())))
}

/// Render the active workspace's current graph
pub async fn render_graph(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<RenderRequest>,
) -> Result<Html<String>, ApiError> {
    let markup = render_active(&state, &request).await?;
    Ok(Html(markup))
}

/// Standalone page showing the active graph and its bird's-eye overview
pub async fn index_page(State(state): State<Arc<ServerState>>) -> Html<String> {
    let body = match render_active(&state, &RenderRequest::default()).await {
        Ok(markup) => markup,
        Err(e) => format!(r#"<p class="viz-error">{}</p>"#, escape(&e.message)),
    };
    let overview = RenderRequest {
        width: Some(OVERVIEW_WIDTH),
        height: Some(OVERVIEW_HEIGHT),
        context: RenderContext::with_visualizer("bird"),
    };
    // the overview is optional; the page still renders without it
    let bird = if state.capabilities.renderers.contains("bird") {
        render_active(&state, &overview).await.unwrap_or_default()
    } else {
        String::new()
    };
    Html(format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>GraphLens</title></head><body><main id=\"graph\">{body}</main><aside id=\"bird\">{bird}</aside></body></html>"
    ))
}

async fn render_active(state: &ServerState, request: &RenderRequest) -> Result<String, ApiError> {
    let ws = state.active_workspace().await?;
    let current = Arc::clone(ws.lock().current());
    let width = request.width.unwrap_or(state.render.width);
    let height = request.height.unwrap_or(state.render.height);
    state
        .capabilities
        .render(&current, width, height, &request.context)
        .map_err(|e| ApiError::plugin(e, StatusCode::INTERNAL_SERVER_ERROR))
}

/// Send the active workspace's current graph to every client.
async fn publish_active(state: &ServerState) {
    if let Ok(ws) = state.active_workspace().await {
        let current = Arc::clone(ws.lock().current());
        state.publish_full(&current);
    }
}

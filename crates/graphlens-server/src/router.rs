//! Axum router setup for the GraphLens server

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{
    handlers::{
        activate_workspace, close_workspace, create_workspace, get_graph, get_queries,
        graph_command, health_check, index_page, list_plugins, list_workspaces, render_graph,
    },
    websocket::ws_handler,
    ServerState,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for live diffs
        .route("/ws", get(ws_handler))
        // REST API endpoints
        .route("/api/health", get(health_check))
        .route("/api/plugins", get(list_plugins))
        .route("/api/workspaces", get(list_workspaces).post(create_workspace))
        .route("/api/workspaces/:key/activate", post(activate_workspace))
        .route("/api/workspaces/:key", delete(close_workspace))
        .route("/api/graph", get(get_graph))
        .route("/api/queries", get(get_queries))
        .route("/api/graph-command", post(graph_command))
        .route("/api/render", post(render_graph))
        .route("/", get(index_page))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! WebSocket handling for live graph updates

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use graphlens_core::{GraphDiff, GraphView};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::ServerState;

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Client asks for the whole current graph
    RequestFullGraph,
    /// Server sends the whole current graph
    FullGraph { graph: GraphView, sequence: u64 },
    /// Server broadcasts what a command changed
    GraphDiff { diff: GraphDiff },
    /// Client acknowledges a diff
    DiffAck { sequence: u64 },
    Ping,
    Pong,
    Error { message: String },
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize the active workspace's current graph; an error message when there is none.
async fn full_graph_message(state: &ServerState) -> WsMessage {
    match state.active_workspace().await {
        Ok(ws) => {
            let current = Arc::clone(ws.lock().current());
            WsMessage::FullGraph {
                graph: GraphView::from(current.as_ref()),
                sequence: state.sequence(),
            }
        }
        Err(e) => WsMessage::Error {
            message: e.to_string(),
        },
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    info!("New WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.diff_tx.subscribe();
    // direct replies to this client
    let (reply_tx, mut reply_rx) = mpsc::channel::<WsMessage>(16);

    let initial = full_graph_message(&state).await;
    match serde_json::to_string(&initial) {
        Ok(json) => {
            if sender.send(Message::Text(json)).await.is_err() {
                warn!("Failed to send initial graph to WebSocket client");
                return;
            }
        }
        Err(e) => warn!("Failed to serialize initial graph: {}", e),
    }

    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<WsMessage>(&text) {
                    Ok(ws_msg) => {
                        if let Some(reply) = handle_client_message(ws_msg, &state_clone).await {
                            if reply_tx.send(reply).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => warn!("Dropping malformed WebSocket message: {}", e),
                },
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        loop {
            let outgoing = tokio::select! {
                received = rx.recv() => match received {
                    Ok(json) => json,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("WebSocket client lagged behind by {} messages", n);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply.map(|m| serde_json::to_string(&m)) {
                    Some(Ok(json)) => json,
                    Some(Err(e)) => {
                        warn!("Failed to serialize reply: {}", e);
                        continue;
                    }
                    None => break,
                },
            };
            if sender.send(Message::Text(outgoing)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("WebSocket connection closed");
}

/// React to one client message, returning the reply to send back, if any.
async fn handle_client_message(msg: WsMessage, state: &ServerState) -> Option<WsMessage> {
    match msg {
        WsMessage::RequestFullGraph => Some(full_graph_message(state).await),
        WsMessage::Ping => Some(WsMessage::Pong),
        WsMessage::DiffAck { sequence } => {
            debug!("Client acknowledged diff {}", sequence);
            None
        }
        other => {
            warn!("Ignoring unexpected client message: {:?}", other);
            None
        }
    }
}

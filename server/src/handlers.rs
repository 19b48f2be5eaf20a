use std::path::PathBuf;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use sketchsync_shared::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::FrameError;
use crate::state::AppState;

pub fn app(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

pub fn decode_frame(message: &Message) -> Result<Option<ClientMessage>, FrameError> {
    match message {
        Message::Text(text) => Ok(Some(serde_json::from_str(text)?)),
        Message::Binary(data) => {
            let (decoded, _) = bincode::decode_from_slice(data, bincode::config::standard())?;
            Ok(Some(decoded))
        }
        _ => Ok(None),
    }
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let connection_id = Uuid::new_v4();

    if state.board.connect(connection_id, tx).is_err() {
        warn!(conn = %connection_id, "board unavailable, closing socket");
        return;
    }
    info!(conn = %connection_id, "ws connected");

    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let payload = match serde_json::to_string(&message) {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(kind = message.kind(), %error, "failed to encode outbound message");
                    continue;
                }
            };
            if socket_sender.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let mut close_frame = None;

    while let Some(Ok(message)) = socket_receiver.next().await {
        if let Message::Close(frame) = message {
            close_frame = frame;
            break;
        }
        match decode_frame(&message) {
            Ok(Some(client_message)) => {
                if state.board.submit(connection_id, client_message).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => debug!(conn = %connection_id, %error, "dropping undecodable frame"),
        }
    }

    let _ = state.board.disconnect(connection_id);
    match &close_frame {
        Some(frame) => info!(
            conn = %connection_id,
            code = frame.code,
            reason = %frame.reason,
            "ws disconnected"
        ),
        None => info!(conn = %connection_id, "ws disconnected"),
    }
    send_task.abort();
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;

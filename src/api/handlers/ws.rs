use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::api::ws_types::WsMessage;
use crate::AppState;

pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn send_json(sink: &mut SplitSink<WebSocket, Message>, msg: &WsMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize WsMessage");
            true
        }
    }
}

/// Toasts and refresh hints go out on one task while the other drains
/// client frames; whichever finishes first tears the connection down.
async fn handle_socket(socket: WebSocket, state: AppState) {
    tracing::info!("Dashboard WebSocket client connected");

    let (mut sink, mut stream) = socket.split();
    let mut rx = state.notifier.subscribe();

    let mut outbound = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    let session_over = matches!(msg, WsMessage::SessionEnded);
                    if !send_json(&mut sink, &msg).await {
                        break;
                    }
                    if session_over {
                        let _ = sink.close().await;
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dashboard WS client lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut inbound = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut outbound => inbound.abort(),
        _ = &mut inbound => outbound.abort(),
    }

    tracing::info!("Dashboard WebSocket client disconnected");
}

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::ws::manager::WsManager;

/// HTTP handler that upgrades the connection to WebSocket.
///
/// Frames larger than the configured maximum are refused by the protocol
/// layer, which ends the connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let max_bytes = state.ws_manager.config().max_message_bytes;
    ws.max_message_size(max_bytes)
        .max_frame_size(max_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state.ws_manager))
}

/// Manage a single relay connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager` (state `Open`).
///   2. Spawns a writer task that drains the connection's queue, bounding
///      every socket write by the configured send timeout. When the relay
///      closes the connection the writer sends a Close frame and stops.
///   3. Relays inbound text/binary frames in arrival order.
///   4. Closes and removes the connection when either side stops.
async fn handle_socket(socket: WebSocket, ws_manager: Arc<WsManager>) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let (mut rx, closed) = ws_manager.add(conn_id.clone()).await;
    let send_timeout = ws_manager.config().send_timeout;

    let (mut sink, mut stream) = socket.split();

    // Writer task: forward queued messages to the WebSocket sink.
    let writer_conn_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                biased;
                _ = closed.cancelled() => break,
                msg = rx.recv() => match msg {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let write = tokio::time::timeout(send_timeout, sink.send(msg));
            let result = tokio::select! {
                biased;
                _ = closed.cancelled() => break,
                result = write => result,
            };
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!(conn_id = %writer_conn_id, error = %e, "WebSocket sink closed");
                    return;
                }
                Err(_) => {
                    tracing::warn!(
                        conn_id = %writer_conn_id,
                        timeout_ms = send_timeout.as_millis() as u64,
                        "WebSocket write timed out"
                    );
                    return;
                }
            }
        }

        if closed.is_cancelled() {
            tracing::debug!(conn_id = %writer_conn_id, "Relay closed connection, sending Close");
            let _ = tokio::time::timeout(send_timeout, sink.send(Message::Close(None))).await;
        }
    });

    // Reader loop: relay inbound frames until the client or the writer stops.
    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(msg @ (Message::Text(_) | Message::Binary(_)))) => {
                    ws_manager.relay(&conn_id, msg).await;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Ping/pong received");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
            _ = &mut send_task => {
                tracing::debug!(conn_id = %conn_id, "WebSocket writer stopped");
                break;
            }
        }
    }

    // Clean up: remove connection and abort the writer task.
    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

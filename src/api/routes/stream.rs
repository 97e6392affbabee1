//! Live task-list stream over WebSocket.
//!
//! Each frame is a JSON text message holding the full task list as an array,
//! in enqueue order. The stream ends when the client closes the socket or a
//! send fails; a client message other than close is ignored.

use super::StreamQuery;
use crate::api::AppState;
use crate::error::StreamDeliveryError;
use crate::stream::{SnapshotSink, StreamEnd};
use crate::types::Task;
use async_trait::async_trait;
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio_util::sync::CancellationToken;

/// GET /ws/queue - Stream task-list snapshots
#[utoipa::path(
    get,
    path = "/ws/queue",
    tag = "queue",
    params(StreamQuery),
    responses(
        (status = 101, description = "WebSocket upgrade; each text frame is a JSON array of tasks"),
        (status = 400, description = "Invalid refresh interval", body = crate::error::ApiError)
    )
)]
pub async fn queue_stream(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let refresh = match query.refresh_secs() {
        Ok(refresh) => refresh,
        Err(e) => return e.into_response(),
    };

    ws.on_upgrade(move |socket| serve_socket(state, socket, refresh))
}

async fn serve_socket(state: AppState, socket: WebSocket, refresh: Option<f64>) {
    let (sender, receiver) = socket.split();
    let disconnected = CancellationToken::new();
    let watcher = tokio::spawn(watch_for_close(receiver, disconnected.clone()));

    let mut sink = WebSocketSink { sender };
    let end = state
        .downloader
        .stream_tasks(refresh, &mut sink, &disconnected)
        .await;

    watcher.abort();
    if !matches!(end, StreamEnd::Disconnected) {
        let _ = sink.sender.close().await;
    }
}

/// Cancel `disconnected` once the client closes or the socket errors
async fn watch_for_close(mut receiver: SplitStream<WebSocket>, disconnected: CancellationToken) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }
    disconnected.cancel();
}

/// Writes snapshots as JSON text frames
struct WebSocketSink {
    sender: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl SnapshotSink for WebSocketSink {
    async fn deliver(&mut self, tasks: &[Task]) -> Result<(), StreamDeliveryError> {
        let json =
            serde_json::to_string(tasks).map_err(|e| StreamDeliveryError::Encode(e.to_string()))?;
        self.sender
            .send(Message::Text(json))
            .await
            .map_err(|e| StreamDeliveryError::Send(e.to_string()))
    }
}

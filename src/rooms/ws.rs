use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{relay::Relay, session::ConnId};

#[debug_handler(state = crate::AppState)]
pub(crate) async fn room_ws(
    State(relay): State<Arc<Relay>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |stream| serve(relay, stream))
}

/// Runs disconnect cleanup when the socket task ends, however it ends.
struct ConnectionGuard {
    relay: Arc<Relay>,
    conn: ConnId,
    closed: bool,
}

impl ConnectionGuard {
    async fn close(mut self) {
        self.closed = true;
        self.relay.disconnect(self.conn).await;
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        // unwinding or cancelled; finish cleanup on the runtime
        let relay = Arc::clone(&self.relay);
        let conn = self.conn;
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                relay.disconnect(conn).await;
            });
        }
    }
}

async fn serve(relay: Arc<Relay>, stream: WebSocket) {
    let (conn, mut rx) = relay.connect().await;
    let guard = ConnectionGuard {
        relay: Arc::clone(&relay),
        conn,
        closed: false,
    };
    info!(%conn, "client connected");

    let (mut sender, mut receiver) = stream.split();

    let mut write_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(e) => {
                    warn!(%conn, "dropping {}: {e}", event.name());
                    continue;
                }
            };
            if sender.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    read_frames(&relay, conn, &mut receiver, &mut write_task).await;

    guard.close().await;
    write_task.abort();
    info!(%conn, "client disconnected");
}

/// Feeds inbound frames to the relay until the socket or the writer ends.
///
/// Only the wait for the next frame races the writer; once a frame is read
/// its handler runs to completion, so no event is left half-applied.
async fn read_frames<S>(
    relay: &Relay,
    conn: ConnId,
    receiver: &mut S,
    write_task: &mut JoinHandle<()>,
) where
    S: Stream<Item = Result<WsMessage, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            msg = receiver.next() => msg,
            _ = &mut *write_task => break,
        };
        match msg {
            Some(Ok(WsMessage::Text(text))) => relay.handle_frame(conn, text.as_str()).await,
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                debug!(%conn, "read failed: {e}");
                break;
            }
        }
    }
}

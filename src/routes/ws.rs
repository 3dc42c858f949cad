//! WebSocket route — one task per drawing connection.
//!
//! DESIGN
//! ======
//! On upgrade, generates a member ID, registers an outbox, and enters a
//! `select!` loop:
//! - Incoming client text → `AppState::receive` (validate, apply, fan out)
//! - Frames queued on this member's outbox → forward to client
//!
//! The handler never decides audiences. Everything it sends to its own
//! client arrives through the same outbox as peer broadcasts, so the client
//! sees one ordered stream.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register outbox, session starts `Unjoined`
//! 2. Client frames → gateway → deliveries enqueued to outboxes
//! 3. Close, socket error, or eviction by the hub → `USER_LEFT` to peers →
//!    room disposal if empty

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::frame::WireFrame;
use crate::services::session::Session;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let member_id = Uuid::new_v4().to_string();

    // Per-connection channel for every frame addressed to this member.
    let (client_tx, mut client_rx) = mpsc::channel::<WireFrame>(state.config.outbox_capacity);
    state.connect(&member_id, client_tx).await;

    let mut session = Session::new(member_id.clone());
    info!(%member_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => state.receive(&mut session, &text).await,
                    Message::Binary(_) => warn!(%member_id, "ws: ignoring binary frame"),
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            frame = client_rx.recv() => {
                // The hub drops our sender when this client falls behind.
                let Some(frame) = frame else {
                    warn!(%member_id, "ws: evicted for lagging, closing");
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                };
                if send_frame(&mut socket, frame).await.is_err() {
                    break;
                }
            }
        }
    }

    state.disconnect(&mut session).await;
    info!(%member_id, "ws: client disconnected");
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_frame(socket: &mut WebSocket, frame: WireFrame) -> Result<(), axum::Error> {
    if !frame.is_cursor() {
        debug!(event = %frame.event, "ws: send frame");
    }
    socket.send(Message::Text(frame.text)).await
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

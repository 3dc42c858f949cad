//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds one `Hub`: the dispatch gateway plus the outbound queue of every
//! live connection. The hub sits behind a single async mutex, so each inbound
//! event is validated, applied, and enqueued to its audience as one step.
//! That gives every room a total order and every client sees deliveries in
//! that order.
//!
//! BACKPRESSURE
//! ============
//! Outboxes are bounded. A full outbox drops cursor frames quietly. Any other
//! frame that cannot be queued evicts the connection: its outbox is removed,
//! the socket task sees the channel close and runs the normal disconnect,
//! and the client rejoins to a full resync.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::config::Config;
use crate::frame::{Frame, WireFrame};
use crate::services::gateway::{Delivery, Gateway};
use crate::services::registry::MemberId;
use crate::services::session::Session;

// =============================================================================
// HUB
// =============================================================================

/// Gateway plus connection outboxes. Only ever touched under the hub lock.
pub struct Hub {
    pub gateway: Gateway,
    /// Connected clients: `member_id` -> sender for outgoing frames.
    pub outboxes: HashMap<MemberId, mpsc::Sender<WireFrame>>,
}

impl Hub {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway, outboxes: HashMap::new() }
    }

    /// Resolve each delivery's audience, encode it once, and enqueue it in
    /// order. Connections that cannot take a non-cursor frame are evicted.
    pub fn deliver(&mut self, sender: &str, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let recipients = self.gateway.recipients(sender, &delivery.audience);
            let frame = Frame::from(delivery.event);
            let wire = match WireFrame::encode(&frame) {
                Ok(wire) => wire,
                Err(e) => {
                    warn!(event = %frame.event, error = %e, "hub: failed to encode frame");
                    continue;
                }
            };
            for member_id in recipients {
                let Some(tx) = self.outboxes.get(&member_id) else {
                    continue;
                };
                match tx.try_send(wire.clone()) {
                    Ok(()) => {}
                    Err(_) if wire.is_cursor() => debug!(%member_id, "hub: dropped cursor frame"),
                    Err(e) => {
                        warn!(%member_id, event = %wire.event, error = %e, "hub: outbox lagging, evicting connection");
                        self.outboxes.remove(&member_id);
                    }
                }
            }
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Mutex<Hub>>,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let gateway = Gateway::new(config.palette.clone(), config.max_history);
        Self { hub: Arc::new(Mutex::new(Hub::new(gateway))), config: Arc::new(config) }
    }

    /// Register a connection's outbound queue.
    pub async fn connect(&self, member_id: &str, tx: mpsc::Sender<WireFrame>) {
        self.hub.lock().await.outboxes.insert(member_id.to_owned(), tx);
    }

    /// Validate, apply, and fan out one inbound text message.
    pub async fn receive(&self, session: &mut Session, text: &str) {
        let mut hub = self.hub.lock().await;
        let deliveries = hub.gateway.dispatch_text(session, text);
        hub.deliver(session.member_id(), deliveries);
    }

    /// Close the session, announce the departure, and drop its outbox.
    pub async fn disconnect(&self, session: &mut Session) {
        let mut hub = self.hub.lock().await;
        let deliveries = hub.gateway.disconnect(session);
        hub.deliver(session.member_id(), deliveries);
        hub.outboxes.remove(session.member_id());
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Create a test `AppState` with a short three-color palette.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(Config {
            palette: vec!["P0".into(), "P1".into(), "P2".into()],
            max_history: 100,
            ..Config::default()
        })
    }

    /// Register a fresh connection and return its session and outbox receiver.
    pub async fn connect(state: &AppState, member_id: &str) -> (Session, mpsc::Receiver<WireFrame>) {
        let (tx, rx) = mpsc::channel(state.config.outbox_capacity);
        state.connect(member_id, tx).await;
        (Session::new(member_id), rx)
    }

    /// Drain and decode every frame currently queued.
    pub fn drain(rx: &mut mpsc::Receiver<WireFrame>) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(wire) = rx.try_recv() {
            frames.push(serde_json::from_str(wire.text.as_str()).expect("queued frame is valid json"));
        }
        frames
    }

    /// Raw `DRAW` text for a brush stroke at `x`.
    #[must_use]
    pub fn draw_text(x: f64) -> String {
        serde_json::json!({
            "event": "DRAW",
            "data": {"tool": "brush", "lineWidth": 5, "from": {"x": x, "y": 0}, "to": {"x": x, "y": 10}, "color": "#000"}
        })
        .to_string()
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;

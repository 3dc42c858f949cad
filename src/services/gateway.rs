//! Dispatch gateway — validates inbound events, mutates room state, and
//! decides who hears about it.
//!
//! DESIGN
//! ======
//! The gateway owns every room's `{membership, history}` pair and is the
//! only writer of either. It never touches a socket: each call returns a
//! list of `Delivery` values (audience + event) that the transport resolves
//! with `recipients` and enqueues in order.
//!
//! | Inbound         | Sender                       | Room minus sender | Whole room                  |
//! |-----------------|------------------------------|-------------------|-----------------------------|
//! | JOIN_ROOM       | init, history, undo/redo     | USER_JOINED       |                             |
//! | DRAW            |                              | DRAW              | undo/redo                   |
//! | CURSOR_MOVE     |                              | CURSOR_MOVE       |                             |
//! | UNDO / REDO     |                              |                   | DRAW_HISTORY, undo/redo     |
//! | CLEAR           |                              |                   | CLEAR, undo/redo (false)    |
//! | REQUEST_HISTORY | history, undo/redo           |                   |                             |
//! | disconnect      |                              | USER_LEFT         |                             |
//!
//! ERROR HANDLING
//! ==============
//! Only join failures reach the client (as `ERROR`). Malformed payloads and
//! events sent before joining are logged and dropped with no state change.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::event::{ClientEvent, ProtocolError, ServerEvent};
use crate::frame::ErrorCode;
use crate::services::history::HistoryStore;
use crate::services::registry::{
    LeaveOutcome, Member, MemberId, MemberRegistry, RegistryError, RoomId, validate_room_id,
};
use crate::services::session::Session;
use crate::services::stroke::{Operation, Point};

// =============================================================================
// TYPES
// =============================================================================

/// Who receives a delivery. Resolved against membership at delivery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    Sender,
    RoomExceptSender(RoomId),
    Room(RoomId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Delivery {
    fn new(audience: Audience, event: ServerEvent) -> Self {
        Self { audience, event }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JoinError {
    #[error(transparent)]
    Identifier(#[from] RegistryError),
    #[error("JOIN_ROOM requires a string room id")]
    RoomIdNotString,
}

impl ErrorCode for JoinError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Identifier(e) => e.error_code(),
            Self::RoomIdNotString => "E_JOIN_FAILED",
        }
    }
}

/// Read-only view of one live room.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomId,
    pub members: Vec<Member>,
    pub history_length: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct Gateway {
    registry: MemberRegistry,
    histories: HashMap<RoomId, HistoryStore>,
    max_history: usize,
}

impl Gateway {
    #[must_use]
    pub fn new(palette: Vec<String>, max_history: usize) -> Self {
        Self { registry: MemberRegistry::new(palette), histories: HashMap::new(), max_history }
    }

    /// Validate and apply one raw inbound text message.
    pub fn dispatch_text(&mut self, session: &mut Session, text: &str) -> Vec<Delivery> {
        match ClientEvent::from_text(text) {
            Ok(event) => self.dispatch(session, event),
            Err(err) => reject(session, &err),
        }
    }

    /// Apply one typed inbound event.
    pub fn dispatch(&mut self, session: &mut Session, event: ClientEvent) -> Vec<Delivery> {
        if session.is_closed() {
            return reject(session, &ProtocolError::SessionClosed);
        }

        if let ClientEvent::JoinRoom(room_id) = &event {
            return match self.join(session, room_id) {
                Ok(deliveries) => deliveries,
                Err(err) => {
                    warn!(member_id = %session.member_id(), %room_id, error = %err, "gateway: join failed");
                    vec![Delivery::new(Audience::Sender, ServerEvent::error(&err))]
                }
            };
        }

        let Some((room_id, color)) = session.joined() else {
            return reject(session, &ProtocolError::NotJoined(event.name()));
        };
        let room_id = room_id.to_owned();
        let color = color.to_owned();

        match event {
            ClientEvent::JoinRoom(_) => Vec::new(),
            ClientEvent::Draw(op) => self.draw(session, room_id, op),
            ClientEvent::CursorMove(pos) => cursor(session, room_id, pos, color),
            ClientEvent::Undo => {
                let history = self.history_mut(&room_id).undo();
                debug!(%room_id, len = history.len(), "gateway: undo");
                self.resync(room_id, history)
            }
            ClientEvent::Redo => {
                let history = self.history_mut(&room_id).redo();
                debug!(%room_id, len = history.len(), "gateway: redo");
                self.resync(room_id, history)
            }
            ClientEvent::Clear => {
                self.history_mut(&room_id).clear();
                info!(%room_id, member_id = %session.member_id(), "gateway: canvas cleared");
                vec![
                    Delivery::new(Audience::Room(room_id.clone()), ServerEvent::Clear),
                    Delivery::new(
                        Audience::Room(room_id),
                        ServerEvent::UndoRedoState { can_undo: false, can_redo: false },
                    ),
                ]
            }
            ClientEvent::RequestHistory => {
                let store = self.history_mut(&room_id);
                vec![
                    Delivery::new(Audience::Sender, ServerEvent::DrawHistory(store.snapshot())),
                    Delivery::new(Audience::Sender, undo_redo_state(store)),
                ]
            }
        }
    }

    /// Close the session, leaving its room and disposing the room if empty.
    pub fn disconnect(&mut self, session: &mut Session) -> Vec<Delivery> {
        let Some(room_id) = session.close() else {
            return Vec::new();
        };
        self.leave(session.member_id(), room_id)
    }

    /// Resolve an audience into member ids, in room join order.
    #[must_use]
    pub fn recipients(&self, sender: &str, audience: &Audience) -> Vec<MemberId> {
        match audience {
            Audience::Sender => vec![sender.to_owned()],
            Audience::RoomExceptSender(room_id) => self
                .registry
                .members(room_id)
                .into_iter()
                .filter(|m| m.id != sender)
                .map(|m| m.id)
                .collect(),
            Audience::Room(room_id) => self.registry.members(room_id).into_iter().map(|m| m.id).collect(),
        }
    }

    #[must_use]
    pub fn room_summary(&self, room_id: &str) -> Option<RoomSummary> {
        if self.registry.count(room_id) == 0 {
            return None;
        }
        let (history_length, can_undo, can_redo) = self
            .histories
            .get(room_id)
            .map_or((0, false, false), |h| (h.len(), h.can_undo(), h.can_redo()));
        Some(RoomSummary {
            room_id: room_id.to_owned(),
            members: self.registry.members(room_id),
            history_length,
            can_undo,
            can_redo,
        })
    }

    // =========================================================================
    // HANDLERS
    // =========================================================================

    fn join(&mut self, session: &mut Session, room_id: &str) -> Result<Vec<Delivery>, JoinError> {
        let member_id = session.member_id().to_owned();
        let mut deliveries = Vec::new();

        // Switching rooms is a full leave of the old one first.
        let switching = session.joined().is_some_and(|(current, _)| current != room_id);
        if switching {
            validate_room_id(room_id)?;
            if let Some(old_room) = session.part() {
                deliveries.extend(self.leave(&member_id, old_room));
            }
        }

        let joined = self.registry.join(room_id, &member_id)?;
        session.join(room_id, joined.color.clone());
        let store = self.history_mut(room_id);

        deliveries.push(Delivery::new(
            Audience::Sender,
            ServerEvent::UserInit { id: member_id.clone(), color: joined.color.clone(), users: joined.members },
        ));
        deliveries.push(Delivery::new(Audience::Sender, ServerEvent::DrawHistory(store.snapshot())));
        deliveries.push(Delivery::new(Audience::Sender, undo_redo_state(store)));

        if joined.inserted {
            info!(%room_id, %member_id, color = %joined.color, members = self.registry.count(room_id), "gateway: member joined");
            deliveries.push(Delivery::new(
                Audience::RoomExceptSender(room_id.to_owned()),
                ServerEvent::UserJoined(Member { id: member_id, color: joined.color }),
            ));
        }
        Ok(deliveries)
    }

    fn leave(&mut self, member_id: &str, room_id: RoomId) -> Vec<Delivery> {
        match self.registry.leave(&room_id, member_id) {
            LeaveOutcome::Absent => return Vec::new(),
            LeaveOutcome::Left => {
                info!(%room_id, %member_id, remaining = self.registry.count(&room_id), "gateway: member left");
            }
            LeaveOutcome::RoomEmptied => {
                self.histories.remove(&room_id);
                info!(%room_id, %member_id, "gateway: room empty, disposed history");
            }
        }
        vec![Delivery::new(Audience::RoomExceptSender(room_id), ServerEvent::UserLeft(member_id.to_owned()))]
    }

    fn draw(&mut self, session: &Session, room_id: RoomId, op: Operation) -> Vec<Delivery> {
        let store = self.history_mut(&room_id);
        if let Err(err) = store.append(op.clone()) {
            warn!(member_id = %session.member_id(), %room_id, error = %err, "gateway: dropped invalid stroke");
            return Vec::new();
        }
        debug!(%room_id, len = store.len(), "gateway: stroke appended");
        let state = undo_redo_state(store);
        vec![
            Delivery::new(Audience::RoomExceptSender(room_id.clone()), ServerEvent::Draw(op)),
            Delivery::new(Audience::Room(room_id), state),
        ]
    }

    fn resync(&mut self, room_id: RoomId, history: Vec<Operation>) -> Vec<Delivery> {
        let state = undo_redo_state(self.history_mut(&room_id));
        vec![
            Delivery::new(Audience::Room(room_id.clone()), ServerEvent::DrawHistory(history)),
            Delivery::new(Audience::Room(room_id), state),
        ]
    }

    fn history_mut(&mut self, room_id: &str) -> &mut HistoryStore {
        let max = self.max_history;
        self.histories
            .entry(room_id.to_owned())
            .or_insert_with(|| HistoryStore::new(max))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn cursor(session: &Session, room_id: RoomId, pos: Point, color: String) -> Vec<Delivery> {
    vec![Delivery::new(
        Audience::RoomExceptSender(room_id),
        ServerEvent::CursorMove { id: session.member_id().to_owned(), pos, color },
    )]
}

/// Protocol errors are dropped silently, except a non-string room id which is
/// a failed join and so is reported to the sender.
fn reject(session: &Session, err: &ProtocolError) -> Vec<Delivery> {
    if matches!(err, ProtocolError::RoomIdNotString) {
        warn!(member_id = %session.member_id(), error = %err, "gateway: join failed");
        return vec![Delivery::new(Audience::Sender, ServerEvent::error(&JoinError::RoomIdNotString))];
    }
    warn!(member_id = %session.member_id(), error = %err, "gateway: dropped inbound message");
    Vec::new()
}

fn undo_redo_state(store: &HistoryStore) -> ServerEvent {
    ServerEvent::UndoRedoState { can_undo: store.can_undo(), can_redo: store.can_redo() }
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

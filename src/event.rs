//! Typed events carried by frames.
//!
//! DESIGN
//! ======
//! `ClientEvent::from_frame` is the validation gate: a frame either becomes a
//! fully-typed event or a `ProtocolError` naming why it was rejected. Nothing
//! downstream ever looks at raw JSON. `ServerEvent` converts back into a
//! `Frame` with the exact payload shapes clients render from.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

use crate::frame::{self, ErrorCode, Frame};
use crate::services::registry::{Member, MemberId};
use crate::services::stroke::{self, Operation, Point, ValidationError};

// =============================================================================
// INBOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinRoom(String),
    Draw(Operation),
    CursorMove(Point),
    Undo,
    Redo,
    Clear,
    RequestHistory,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(String),
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    #[error("JOIN_ROOM requires a string room id")]
    RoomIdNotString,
    #[error("invalid {event} payload: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("{0} before joining a room")]
    NotJoined(&'static str),
    #[error("session is closed")]
    SessionClosed,
}

impl ClientEvent {
    /// Decode raw websocket text into a typed event.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` for non-JSON text and the frame-level errors of
    /// `from_frame` otherwise.
    pub fn from_text(text: &str) -> Result<Self, ProtocolError> {
        let frame: Frame = serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
        Self::from_frame(&frame)
    }

    /// Validate a frame into a typed event.
    ///
    /// # Errors
    ///
    /// Returns `UnknownEvent`, `RoomIdNotString`, or `InvalidPayload`.
    pub fn from_frame(frame: &Frame) -> Result<Self, ProtocolError> {
        let event = match frame.event.as_str() {
            frame::JOIN_ROOM => match &frame.data {
                Value::String(room_id) => Self::JoinRoom(room_id.clone()),
                _ => return Err(ProtocolError::RoomIdNotString),
            },
            frame::DRAW => Self::Draw(
                stroke::parse_operation(&frame.data)
                    .map_err(|source| ProtocolError::InvalidPayload { event: frame::DRAW, source })?,
            ),
            frame::CURSOR_MOVE => Self::CursorMove(
                stroke::parse_cursor(&frame.data)
                    .map_err(|source| ProtocolError::InvalidPayload { event: frame::CURSOR_MOVE, source })?,
            ),
            frame::UNDO => Self::Undo,
            frame::REDO => Self::Redo,
            frame::CLEAR => Self::Clear,
            frame::REQUEST_HISTORY => Self::RequestHistory,
            other => return Err(ProtocolError::UnknownEvent(other.to_owned())),
        };
        Ok(event)
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinRoom(_) => frame::JOIN_ROOM,
            Self::Draw(_) => frame::DRAW,
            Self::CursorMove(_) => frame::CURSOR_MOVE,
            Self::Undo => frame::UNDO,
            Self::Redo => frame::REDO,
            Self::Clear => frame::CLEAR,
            Self::RequestHistory => frame::REQUEST_HISTORY,
        }
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    UserInit { id: MemberId, color: String, users: Vec<Member> },
    UserJoined(Member),
    UserLeft(MemberId),
    DrawHistory(Vec<Operation>),
    Draw(Operation),
    CursorMove { id: MemberId, pos: Point, color: String },
    Clear,
    UndoRedoState { can_undo: bool, can_redo: bool },
    Error { message: String, code: &'static str },
}

impl ServerEvent {
    pub fn error(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::Error { message: err.to_string(), code: err.error_code() }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserInit { .. } => frame::USER_INIT,
            Self::UserJoined(_) => frame::USER_JOINED,
            Self::UserLeft(_) => frame::USER_LEFT,
            Self::DrawHistory(_) => frame::DRAW_HISTORY,
            Self::Draw(_) => frame::DRAW,
            Self::CursorMove { .. } => frame::CURSOR_MOVE,
            Self::Clear => frame::CLEAR,
            Self::UndoRedoState { .. } => frame::UNDO_REDO_STATE,
            Self::Error { .. } => frame::ERROR,
        }
    }
}

impl From<ServerEvent> for Frame {
    fn from(event: ServerEvent) -> Self {
        let name = event.name();
        let data = match event {
            ServerEvent::UserInit { id, color, users } => json!({"id": id, "color": color, "users": users}),
            ServerEvent::UserJoined(member) => json!(member),
            ServerEvent::UserLeft(id) => json!(id),
            ServerEvent::DrawHistory(ops) => to_payload(name, &ops),
            ServerEvent::Draw(op) => to_payload(name, &op),
            ServerEvent::CursorMove { id, pos, color } => json!({"id": id, "pos": pos, "color": color}),
            ServerEvent::Clear => return Frame::bare(name),
            ServerEvent::UndoRedoState { can_undo, can_redo } => json!({"canUndo": can_undo, "canRedo": can_redo}),
            ServerEvent::Error { message, code } => json!({"message": message, "code": code}),
        };
        Frame::new(name, data)
    }
}

/// Encode a typed payload, logging and sending `null` if it cannot be encoded.
fn to_payload(event: &str, payload: &impl Serialize) -> Value {
    serde_json::to_value(payload).unwrap_or_else(|e| {
        warn!(%event, error = %e, "event: failed to encode payload");
        Value::Null
    })
}

#[cfg(test)]
#[path = "event_test.rs"]
mod tests;

//! Frame — the wire envelope for every websocket message.
//!
//! ARCHITECTURE
//! ============
//! Clients and server exchange JSON text messages shaped as
//! `{"event": "DRAW", "data": {...}}`. The transport only ever parses and
//! serializes `Frame`; the typed meaning of `data` is recovered in
//! `crate::event`, which is the single place that knows payload shapes.
//!
//! DESIGN
//! ======
//! - `data` defaults to `null` so payload-less events (`UNDO`, `CLEAR`, ...)
//!   may omit it entirely.
//! - Event names are SCREAMING_SNAKE constants, never free strings at call
//!   sites.
//! - Outbound frames are encoded once into a `WireFrame`; every recipient's
//!   outbox gets a clone sharing the same text buffer.

use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};

// =============================================================================
// EVENT NAMES
// =============================================================================

pub const JOIN_ROOM: &str = "JOIN_ROOM";
pub const DRAW: &str = "DRAW";
pub const CURSOR_MOVE: &str = "CURSOR_MOVE";
pub const UNDO: &str = "UNDO";
pub const REDO: &str = "REDO";
pub const CLEAR: &str = "CLEAR";
pub const REQUEST_HISTORY: &str = "REQUEST_HISTORY";

pub const USER_INIT: &str = "USER_INIT";
pub const USER_JOINED: &str = "USER_JOINED";
pub const USER_LEFT: &str = "USER_LEFT";
pub const DRAW_HISTORY: &str = "DRAW_HISTORY";
pub const UNDO_REDO_STATE: &str = "UNDO_REDO_STATE";
pub const ERROR: &str = "ERROR";

// =============================================================================
// TYPES
// =============================================================================

/// The universal message type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured error frames.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<serde_json::Value>) -> Self {
        Self { event: event.into(), data: data.into() }
    }

    /// Frame with no payload.
    pub fn bare(event: impl Into<String>) -> Self {
        Self { event: event.into(), data: serde_json::Value::Null }
    }
}

// =============================================================================
// WIRE FRAME
// =============================================================================

/// A frame already serialized to websocket text. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct WireFrame {
    pub event: String,
    pub text: Utf8Bytes,
}

impl WireFrame {
    /// Serialize `frame` once for fan-out.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the payload cannot be encoded.
    pub fn encode(frame: &Frame) -> Result<Self, serde_json::Error> {
        let text = serde_json::to_string(frame)?;
        Ok(Self { event: frame.event.clone(), text: text.into() })
    }

    /// Cursor frames are ephemeral: they may be dropped under load and are
    /// kept out of per-frame logging.
    #[must_use]
    pub fn is_cursor(&self) -> bool {
        self.event == CURSOR_MOVE
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_defaults_to_null() {
        let frame: Frame = serde_json::from_str(r#"{"event":"UNDO"}"#).expect("parse");
        assert_eq!(frame.event, UNDO);
        assert!(frame.data.is_null());
    }

    #[test]
    fn bare_serializes_null_data() {
        let json = serde_json::to_value(Frame::bare(CLEAR)).expect("serialize");
        assert_eq!(json, serde_json::json!({"event": "CLEAR", "data": null}));
    }

    #[test]
    fn new_carries_payload() {
        let frame = Frame::new(JOIN_ROOM, "main");
        let json = serde_json::to_string(&frame).expect("serialize");
        assert_eq!(json, r#"{"event":"JOIN_ROOM","data":"main"}"#);
    }

    #[test]
    fn cursor_detection() {
        assert!(WireFrame::encode(&Frame::bare(CURSOR_MOVE)).expect("encode").is_cursor());
        assert!(!WireFrame::encode(&Frame::bare(DRAW)).expect("encode").is_cursor());
    }

    #[test]
    fn wire_frame_carries_serialized_text() {
        let wire = WireFrame::encode(&Frame::new(JOIN_ROOM, "main")).expect("encode");
        assert_eq!(wire.event, JOIN_ROOM);
        assert_eq!(wire.text.as_str(), r#"{"event":"JOIN_ROOM","data":"main"}"#);
    }

    #[test]
    fn wire_frame_clones_share_text() {
        let wire = WireFrame::encode(&Frame::new(DRAW, serde_json::json!({"x": 1}))).expect("encode");
        let copy = wire.clone();
        assert_eq!(wire.text.as_str().as_ptr(), copy.text.as_str().as_ptr());
    }

    #[test]
    fn rejects_frame_without_event() {
        assert!(serde_json::from_str::<Frame>(r#"{"data":1}"#).is_err());
    }
}

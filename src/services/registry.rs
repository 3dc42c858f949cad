//! Member registry — room membership and display colors.
//!
//! DESIGN
//! ======
//! Each room maps to an insertion-ordered member list. A joining member is
//! colored by position: `palette[members_before_join % palette.len()]`.
//! Freed positions are not tracked, so after out-of-order leaves a newcomer
//! can share a color with a member who is still present.
//!
//! A room entry exists only while it has members; the last `leave` removes
//! it and reports so, letting the caller dispose of per-room state.

use std::collections::HashMap;

use serde::Serialize;

use crate::frame::ErrorCode;

pub type RoomId = String;
pub type MemberId = String;

pub const MAX_ROOM_ID_LEN: usize = 50;
pub const MAX_MEMBER_ID_LEN: usize = 128;

/// Built-in palette. Order is significant.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#FFA07A", "#98D8C8", "#F7DC6F", "#BB8FCE", "#85C1E2", "#F8B739", "#52B788",
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub color: String,
    pub members: Vec<Member>,
    /// False when the member was already present (idempotent re-join).
    pub inserted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Member was not in the room.
    Absent,
    /// Member removed; others remain.
    Left,
    /// Member removed and the room entry was dropped.
    RoomEmptied,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },
}

impl ErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier { .. } => "E_INVALID_IDENTIFIER",
        }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

pub struct MemberRegistry {
    rooms: HashMap<RoomId, Vec<Member>>,
    palette: Vec<String>,
}

impl MemberRegistry {
    /// Registry over a caller-supplied palette. An empty palette falls back
    /// to `DEFAULT_PALETTE`.
    #[must_use]
    pub fn new(palette: Vec<String>) -> Self {
        let palette = if palette.is_empty() { default_palette() } else { palette };
        Self { rooms: HashMap::new(), palette }
    }

    /// Add `member_id` to `room_id`, or return its existing color if present.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` if either identifier is malformed.
    pub fn join(&mut self, room_id: &str, member_id: &str) -> Result<JoinOutcome, RegistryError> {
        validate_room_id(room_id)?;
        validate_member_id(member_id)?;

        let members = self.rooms.entry(room_id.to_owned()).or_default();
        if let Some(existing) = members.iter().find(|m| m.id == member_id) {
            return Ok(JoinOutcome { color: existing.color.clone(), members: members.clone(), inserted: false });
        }

        let color = self.palette[members.len() % self.palette.len()].clone();
        members.push(Member { id: member_id.to_owned(), color: color.clone() });
        Ok(JoinOutcome { color, members: members.clone(), inserted: true })
    }

    /// Remove `member_id` from `room_id`. Absent members are not an error.
    pub fn leave(&mut self, room_id: &str, member_id: &str) -> LeaveOutcome {
        let Some(members) = self.rooms.get_mut(room_id) else {
            return LeaveOutcome::Absent;
        };
        let before = members.len();
        members.retain(|m| m.id != member_id);
        if members.len() == before {
            return LeaveOutcome::Absent;
        }
        if members.is_empty() {
            self.rooms.remove(room_id);
            return LeaveOutcome::RoomEmptied;
        }
        LeaveOutcome::Left
    }

    /// Members of `room_id` in join order. Empty for unknown rooms.
    #[must_use]
    pub fn members(&self, room_id: &str) -> Vec<Member> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self, room_id: &str) -> usize {
        self.rooms.get(room_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
impl MemberRegistry {
    pub fn contains(&self, room_id: &str, member_id: &str) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|members| members.iter().any(|m| m.id == member_id))
    }
}

#[cfg(test)]
impl Default for MemberRegistry {
    fn default() -> Self {
        Self::new(default_palette())
    }
}

#[must_use]
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect()
}

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Room ids are 1..=50 ASCII alphanumerics or hyphens.
///
/// # Errors
///
/// Returns `InvalidIdentifier` for anything else.
pub fn validate_room_id(room_id: &str) -> Result<(), RegistryError> {
    let ok = !room_id.is_empty()
        && room_id.len() <= MAX_ROOM_ID_LEN
        && room_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if ok { Ok(()) } else { Err(invalid("room", room_id)) }
}

/// Member ids are opaque but must be non-empty, bounded, and printable.
///
/// # Errors
///
/// Returns `InvalidIdentifier` for empty, oversized, or control-bearing ids.
pub fn validate_member_id(member_id: &str) -> Result<(), RegistryError> {
    let ok = !member_id.is_empty()
        && member_id.len() <= MAX_MEMBER_ID_LEN
        && !member_id.chars().any(|c| c.is_control() || c.is_whitespace());
    if ok { Ok(()) } else { Err(invalid("member", member_id)) }
}

fn invalid(kind: &'static str, value: &str) -> RegistryError {
    RegistryError::InvalidIdentifier { kind, value: value.to_owned() }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

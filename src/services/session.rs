//! Session — per-connection presence record.
//!
//! A session starts `Unjoined`, becomes `Joined` after a successful room join,
//! and ends `Closed` on disconnect. Closed is terminal.

use crate::services::registry::{MemberId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Unjoined,
    Joined { room_id: RoomId, color: String },
    Closed,
}

#[derive(Debug, Clone)]
pub struct Session {
    member_id: MemberId,
    presence: Presence,
}

impl Session {
    #[must_use]
    pub fn new(member_id: impl Into<MemberId>) -> Self {
        Self { member_id: member_id.into(), presence: Presence::Unjoined }
    }

    #[must_use]
    pub fn member_id(&self) -> &str {
        &self.member_id
    }

    #[cfg(test)]
    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Current room and color, if joined.
    #[must_use]
    pub fn joined(&self) -> Option<(&str, &str)> {
        match &self.presence {
            Presence::Joined { room_id, color } => Some((room_id.as_str(), color.as_str())),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.presence == Presence::Closed
    }

    /// Enter `room_id`. Ignored once closed.
    pub fn join(&mut self, room_id: impl Into<RoomId>, color: impl Into<String>) {
        if self.is_closed() {
            return;
        }
        self.presence = Presence::Joined { room_id: room_id.into(), color: color.into() };
    }

    /// Drop back to `Unjoined`, returning the room left.
    pub fn part(&mut self) -> Option<RoomId> {
        match std::mem::replace(&mut self.presence, Presence::Unjoined) {
            Presence::Joined { room_id, .. } => Some(room_id),
            other => {
                self.presence = other;
                None
            }
        }
    }

    /// Close the session, returning the room it was in.
    pub fn close(&mut self) -> Option<RoomId> {
        match std::mem::replace(&mut self.presence, Presence::Closed) {
            Presence::Joined { room_id, .. } => Some(room_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unjoined() {
        let s = Session::new("m1");
        assert_eq!(s.member_id(), "m1");
        assert_eq!(s.presence(), &Presence::Unjoined);
        assert!(s.joined().is_none());
    }

    #[test]
    fn join_then_close() {
        let mut s = Session::new("m1");
        s.join("r1", "#fff");
        assert_eq!(s.joined(), Some(("r1", "#fff")));
        assert_eq!(s.close(), Some("r1".to_string()));
        assert!(s.is_closed());
        assert!(s.joined().is_none());
    }

    #[test]
    fn close_unjoined_returns_none() {
        let mut s = Session::new("m1");
        assert_eq!(s.close(), None);
        assert!(s.is_closed());
    }

    #[test]
    fn closed_is_terminal() {
        let mut s = Session::new("m1");
        s.close();
        s.join("r1", "#fff");
        assert!(s.is_closed());
        assert_eq!(s.part(), None);
        assert!(s.is_closed());
    }

    #[test]
    fn part_returns_to_unjoined() {
        let mut s = Session::new("m1");
        s.join("r1", "#fff");
        assert_eq!(s.part(), Some("r1".to_string()));
        assert_eq!(s.presence(), &Presence::Unjoined);
    }
}

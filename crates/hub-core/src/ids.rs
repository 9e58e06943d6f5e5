//! Identifiers for connections and rooms.

use std::fmt;

/// Identifier for a live client connection.
///
/// Opaque to everything except the transport that assigns it; the only
/// guarantee is uniqueness over the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// A logical broadcast group.
///
/// Rooms have no representation beyond the connections currently joined
/// to them. A project room and a user room never collide, even when their
/// keys are the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Collaboration channel for everyone viewing a project board.
    Project(String),

    /// Private notification channel, keyed by a stable user identity (email).
    User(String),
}

impl RoomId {
    pub fn project(id: impl Into<String>) -> Self {
        RoomId::Project(id.into())
    }

    pub fn user(key: impl Into<String>) -> Self {
        RoomId::User(key.into())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::Project(id) => write!(f, "project:{}", id),
            RoomId::User(key) => write!(f, "user:{}", key),
        }
    }
}

//! Connection registry.
//!
//! Bookkeeping of which rooms each live connection has joined, indexed
//! both ways:
//! - connection -> rooms, so disconnect cleanup knows what to purge;
//! - room -> connections, so the router can resolve recipients.
//!
//! Every operation tolerates unknown connections and rooms. Rapid
//! reconnects can reorder join/leave traffic, and treating "not found"
//! as "already clean" keeps that harmless.

use std::collections::HashMap;

use indexmap::IndexSet;

use crate::ids::{ConnectionId, RoomId};

/// State attached to one live connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Connection {
    /// Email supplied by `authenticate`.
    pub email: Option<String>,

    /// Rooms this connection is a member of, in join order.
    pub rooms: IndexSet<RoomId>,
}

/// Two-way index between connections and rooms.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,

    /// Room -> members in join order. Rooms with no members are removed.
    members: HashMap<RoomId, IndexSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        ConnectionRegistry::default()
    }

    /// Record a freshly opened connection. Re-registering is a no-op.
    pub fn register(&mut self, conn: ConnectionId) {
        self.connections.entry(conn).or_default();
    }

    /// Add `room` to the connection's joined set. Idempotent.
    ///
    /// Returns `true` if the connection was not already a member.
    pub fn join(&mut self, conn: ConnectionId, room: RoomId) -> bool {
        let newly_joined = self
            .connections
            .entry(conn)
            .or_default()
            .rooms
            .insert(room.clone());

        self.members.entry(room).or_default().insert(conn);
        newly_joined
    }

    /// Remove `room` from the connection's joined set.
    ///
    /// Returns `true` if the connection was a member.
    pub fn leave(&mut self, conn: ConnectionId, room: &RoomId) -> bool {
        let was_member = match self.connections.get_mut(&conn) {
            Some(c) => c.rooms.shift_remove(room),
            None => false,
        };
        self.detach_member(room, conn);
        was_member
    }

    /// Purge the connection and return every room it was in.
    ///
    /// After this returns nothing in the registry refers to `conn`. Callers
    /// that keep their own per-room state must clean it up using the
    /// returned rooms.
    pub fn on_disconnect(&mut self, conn: ConnectionId) -> Vec<RoomId> {
        let Some(connection) = self.connections.remove(&conn) else {
            return Vec::new();
        };

        let rooms: Vec<RoomId> = connection.rooms.into_iter().collect();
        for room in &rooms {
            self.detach_member(room, conn);
        }
        rooms
    }

    /// Members of `room`, in join order.
    pub fn members(&self, room: &RoomId) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members
            .get(room)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Rooms the connection has joined, in join order.
    pub fn rooms_of(&self, conn: ConnectionId) -> Vec<RoomId> {
        self.connections
            .get(&conn)
            .map(|c| c.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, conn: ConnectionId, room: &RoomId) -> bool {
        self.members
            .get(room)
            .map(|set| set.contains(&conn))
            .unwrap_or(false)
    }

    pub fn get(&self, conn: ConnectionId) -> Option<&Connection> {
        self.connections.get(&conn)
    }

    pub fn get_mut(&mut self, conn: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(&conn)
    }

    /// Number of live connections known to the registry.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.members.len()
    }

    fn detach_member(&mut self, room: &RoomId, conn: ConnectionId) {
        if let Some(set) = self.members.get_mut(room) {
            set.shift_remove(&conn);
            if set.is_empty() {
                self.members.remove(room);
            }
        }
    }
}

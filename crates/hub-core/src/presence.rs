//! Presence table: project room -> roster.
//!
//! Each room holds one entry per *connection*, not per user. Two browser
//! tabs of the same person show up as two entries; the roster is a flat,
//! insertion-ordered list and is broadcast exactly as stored.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::events::UserDescriptor;
use crate::ids::{ConnectionId, RoomId};

#[derive(Debug, Default)]
pub struct PresenceTable {
    /// Room -> (connection -> descriptor), insertion-ordered.
    ///
    /// Rooms whose last entry is removed are dropped from the map.
    rooms: HashMap<RoomId, IndexMap<ConnectionId, UserDescriptor>>,
}

impl PresenceTable {
    pub fn new() -> Self {
        PresenceTable::default()
    }

    /// Insert the entry for `conn` in `room`, or overwrite it in place.
    ///
    /// A client re-emitting `join_project` (refresh, reconnect on the same
    /// socket) replaces its descriptor but keeps its roster position.
    pub fn add_or_replace(&mut self, room: RoomId, conn: ConnectionId, user: UserDescriptor) {
        self.rooms.entry(room).or_default().insert(conn, user);
    }

    /// Delete the entry for `conn` in `room`. Returns `true` if one existed.
    pub fn remove(&mut self, room: &RoomId, conn: ConnectionId) -> bool {
        let Some(entries) = self.rooms.get_mut(room) else {
            return false;
        };

        let removed = entries.shift_remove(&conn).is_some();
        if entries.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Current roster of `room` in insertion order. Empty for unknown rooms.
    pub fn list_users(&self, room: &RoomId) -> Vec<UserDescriptor> {
        self.rooms
            .get(room)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Remove `conn` from each of `rooms`, returning only the rooms that
    /// actually had an entry removed.
    pub fn remove_connection_from_all_rooms(
        &mut self,
        conn: ConnectionId,
        rooms: &[RoomId],
    ) -> Vec<RoomId> {
        rooms
            .iter()
            .filter(|room| self.remove(room, conn))
            .cloned()
            .collect()
    }

    /// Whether `conn` has an entry in `room`.
    pub fn contains(&self, room: &RoomId, conn: ConnectionId) -> bool {
        self.rooms
            .get(room)
            .map(|entries| entries.contains_key(&conn))
            .unwrap_or(false)
    }

    /// Number of rooms with at least one entry.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

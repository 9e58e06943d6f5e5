//! The real-time hub: event dispatcher over registry, presence and router.
//!
//! One `RealtimeHub` exists per server process and is owned by a single
//! task, so every handler runs to completion before the next event is
//! looked at. That is the whole concurrency story: no locks, and every
//! operation is either idempotent or last-write-wins, so any interleaving
//! of events from different connections is safe.
//!
//! Connection lifecycle, as implied by connection state:
//!
//! ```text
//! Opened -> (authenticate) -> authenticated -> (join_project)* -> in project rooms
//!    \___________________________ Closed: purge from every room ___________/
//! ```

use crate::events::{ConnectionEvent, InboundEvent, OutboundEvent, UserDescriptor};
use crate::ids::{ConnectionId, RoomId};
use crate::presence::PresenceTable;
use crate::registry::ConnectionRegistry;
use crate::router::{Delivery, RoomRouter};

#[derive(Debug, Default)]
pub struct RealtimeHub {
    registry: ConnectionRegistry,
    presence: PresenceTable,
}

impl RealtimeHub {
    pub fn new() -> Self {
        RealtimeHub::default()
    }

    /// Process one event for `conn` and return what must be delivered.
    ///
    /// Deliveries with no recipients are dropped before returning.
    pub fn process(&mut self, conn: ConnectionId, event: ConnectionEvent) -> Vec<Delivery> {
        let mut deliveries = match event {
            ConnectionEvent::Opened => {
                self.registry.register(conn);
                Vec::new()
            }
            ConnectionEvent::Inbound(inbound) => self.process_inbound(conn, inbound),
            ConnectionEvent::Closed => self.process_disconnect(conn),
        };

        deliveries.retain(|d| !d.is_empty());
        deliveries
    }

    // -------------------------------------------------------------------------
    // Internal handlers
    // -------------------------------------------------------------------------

    fn process_inbound(&mut self, conn: ConnectionId, event: InboundEvent) -> Vec<Delivery> {
        // Events for a connection that was never opened, or is already
        // closed, must not resurrect it.
        if self.registry.get(conn).is_none() {
            return Vec::new();
        }

        match event {
            InboundEvent::Authenticate { email } => self.process_authenticate(conn, email),
            InboundEvent::JoinProject { project_id, user } => {
                self.process_join_project(conn, project_id, user)
            }
            InboundEvent::LeaveProject { project_id } => {
                self.process_leave_project(conn, project_id)
            }
            InboundEvent::TaskMoved {
                project_id,
                payload,
            } => vec![self.router().broadcast_except_sender(
                &RoomId::Project(project_id),
                OutboundEvent::TaskUpdated(payload),
                conn,
            )],
            InboundEvent::NewComment {
                project_id,
                payload,
            } => vec![self.router().broadcast_except_sender(
                &RoomId::Project(project_id),
                OutboundEvent::CommentReceived(payload),
                conn,
            )],
            InboundEvent::NotifyInvite { email, project } => {
                vec![self
                    .router()
                    .send_to_user_room(&email, OutboundEvent::ProjectAdded(project))]
            }
        }
    }

    fn process_authenticate(&mut self, conn: ConnectionId, email: String) -> Vec<Delivery> {
        let previous = self
            .registry
            .get_mut(conn)
            .and_then(|c| c.email.replace(email.clone()));

        // Re-authenticating as someone else must stop the old identity's
        // private pushes from reaching this connection.
        if let Some(old) = previous.filter(|old| *old != email) {
            self.registry.leave(conn, &RoomId::User(old));
        }

        self.registry.join(conn, RoomId::User(email));
        Vec::new()
    }

    fn process_join_project(
        &mut self,
        conn: ConnectionId,
        project_id: String,
        user: UserDescriptor,
    ) -> Vec<Delivery> {
        let room = RoomId::Project(project_id);

        self.registry.join(conn, room.clone());
        self.presence.add_or_replace(room.clone(), conn, user);

        vec![self.roster_delivery(&room)]
    }

    fn process_leave_project(&mut self, conn: ConnectionId, project_id: String) -> Vec<Delivery> {
        let room = RoomId::Project(project_id);

        self.registry.leave(conn, &room);
        if self.presence.remove(&room, conn) {
            vec![self.roster_delivery(&room)]
        } else {
            Vec::new()
        }
    }

    fn process_disconnect(&mut self, conn: ConnectionId) -> Vec<Delivery> {
        let rooms = self.registry.on_disconnect(conn);
        let changed = self.presence.remove_connection_from_all_rooms(conn, &rooms);

        changed
            .iter()
            .map(|room| self.roster_delivery(room))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn router(&self) -> RoomRouter<'_> {
        RoomRouter::new(&self.registry)
    }

    /// `users_updated` snapshot for `room`, addressed to all its members.
    fn roster_delivery(&self, room: &RoomId) -> Delivery {
        let roster = self.presence.list_users(room);
        self.router()
            .broadcast_all(room, OutboundEvent::UsersUpdated(roster))
    }

    /// For tests or admin queries: current roster of a project.
    pub fn roster(&self, project_id: &str) -> Vec<UserDescriptor> {
        self.presence.list_users(&RoomId::project(project_id))
    }

    /// For tests or admin queries: rooms a connection is in.
    pub fn rooms_of(&self, conn: ConnectionId) -> Vec<RoomId> {
        self.registry.rooms_of(conn)
    }

    /// For tests or admin queries: number of open connections.
    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// For tests or admin queries: number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.registry.room_count()
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceTable {
        &self.presence
    }
}

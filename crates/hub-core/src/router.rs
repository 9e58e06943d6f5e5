//! Room router: resolves who receives an outbound event.
//!
//! Delivery policy:
//! - domain relays (`task_updated`, `comment_received`) go to every member
//!   of the room **except** the sender;
//! - presence snapshots (`users_updated`) go to every member, sender
//!   included, so a joining client gets its initial roster;
//! - private pushes (`project_added`) go to the user's notification room.
//!
//! The router never touches sockets. It produces [`Delivery`] values and
//! the transport layer writes them out. Within one room, deliveries keep
//! the order in which the hub produced them.

use crate::events::OutboundEvent;
use crate::ids::{ConnectionId, RoomId};
use crate::registry::ConnectionRegistry;

/// One outbound event and the connections that should receive it.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub recipients: Vec<ConnectionId>,
    pub event: OutboundEvent,
}

impl Delivery {
    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// Read-only view over the registry for recipient resolution.
#[derive(Debug, Clone, Copy)]
pub struct RoomRouter<'a> {
    registry: &'a ConnectionRegistry,
}

impl<'a> RoomRouter<'a> {
    pub fn new(registry: &'a ConnectionRegistry) -> Self {
        RoomRouter { registry }
    }

    /// Every member of `room` except `sender`.
    pub fn broadcast_except_sender(
        &self,
        room: &RoomId,
        event: OutboundEvent,
        sender: ConnectionId,
    ) -> Delivery {
        let recipients = self
            .registry
            .members(room)
            .filter(|&conn| conn != sender)
            .collect();
        Delivery { recipients, event }
    }

    /// Every member of `room`, sender included.
    pub fn broadcast_all(&self, room: &RoomId, event: OutboundEvent) -> Delivery {
        Delivery {
            recipients: self.registry.members(room).collect(),
            event,
        }
    }

    /// Every connection authenticated as `user_key`, whatever project
    /// rooms they are in.
    pub fn send_to_user_room(&self, user_key: &str, event: OutboundEvent) -> Delivery {
        self.broadcast_all(&RoomId::user(user_key), event)
    }
}

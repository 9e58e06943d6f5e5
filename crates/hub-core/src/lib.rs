//! hub-core
//!
//! Pure real-time collaboration state:
//! - identifiers (connections, rooms)
//! - event catalog (inbound / outbound)
//! - connection registry (who joined which room)
//! - presence table (per-project rosters)
//! - room router (recipient resolution)
//! - the hub itself, which dispatches events over all of the above

pub mod ids;
pub mod events;
pub mod error;
pub mod registry;
pub mod presence;
pub mod router;
pub mod hub;

pub use ids::{ConnectionId, RoomId};

pub use events::{
    ConnectionEvent,
    InboundEvent,
    OutboundEvent,
    UserDescriptor,
};

pub use error::EventError;
pub use registry::{Connection, ConnectionRegistry};
pub use presence::PresenceTable;
pub use router::{Delivery, RoomRouter};
pub use hub::RealtimeHub;

//! Shared types for the hub server.
//!
//! This module defines:
//! - channel aliases between connection tasks and the hub task
//! - `ClientRegistry`: where the hub task finds each client's outbound channel
//! - `HubRequest`: messages flowing from connection tasks to the hub

use std::sync::Arc;

use dashmap::DashMap;
use hub_core::{ConnectionEvent, ConnectionId};
use tokio::sync::mpsc;

/// An encoded outbound frame, shared by every recipient of one delivery.
pub type OutboundFrame = Arc<str>;

/// Outbound frames from the hub to a given client.
pub type OutboundTx = mpsc::UnboundedSender<OutboundFrame>;
pub type OutboundRx = mpsc::UnboundedReceiver<OutboundFrame>;

/// Registry of connected clients and their outbound channels.
///
/// - Key: `ConnectionId`
/// - Value: `OutboundTx` to push encoded frames to that client.
pub type ClientRegistry = Arc<DashMap<ConnectionId, OutboundTx>>;

/// Message flowing from a connection task into the hub task.
#[derive(Debug)]
pub struct HubRequest {
    pub client_id: ConnectionId,
    pub event: ConnectionEvent,
}

/// Channel from connection tasks → hub task.
pub type HubTx = mpsc::UnboundedSender<HubRequest>;
pub type HubRx = mpsc::UnboundedReceiver<HubRequest>;

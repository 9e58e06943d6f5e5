//! Central hub loop.
//!
//! This task owns the `RealtimeHub` instance and processes every
//! `HubRequest` coming from connection tasks, strictly one at a time and
//! in arrival order. That single owner is what makes the hub's state
//! lock-free.
//!
//! Each resulting `Delivery` is encoded once and pushed to the outbound
//! channel of every recipient that is still registered. Recipients that
//! vanished in the meantime are skipped; their own `Closed` request is
//! already queued behind this one.

use std::sync::Arc;

use hub_core::{ConnectionEvent, Delivery, RealtimeHub};
use hub_protocol::encode_output;
use tracing::{debug, info, warn};

use crate::types::{ClientRegistry, HubRequest, HubRx, OutboundFrame};

/// Run the central hub processing loop.
///
/// - `hub_rx`: receives requests from all connection tasks.
/// - `clients`: registry of connected clients and their outbound channels.
pub async fn run_hub_loop(mut hub_rx: HubRx, clients: ClientRegistry) {
    let mut hub = RealtimeHub::new();

    while let Some(req) = hub_rx.recv().await {
        let HubRequest { client_id, event } = req;

        match &event {
            ConnectionEvent::Opened => debug!(client = %client_id, "opened"),
            ConnectionEvent::Inbound(inbound) => {
                debug!(client = %client_id, event = inbound.name(), "inbound")
            }
            ConnectionEvent::Closed => debug!(client = %client_id, "closed"),
        }

        let deliveries = hub.process(client_id, event);

        for delivery in &deliveries {
            route_delivery(delivery, &clients);
        }
    }

    info!(
        connections = hub.connection_count(),
        "hub loop shutting down (hub_rx closed)"
    );
}

/// Push one delivery to each of its recipients.
fn route_delivery(delivery: &Delivery, clients: &ClientRegistry) {
    let frame: OutboundFrame = match encode_output(&delivery.event) {
        Ok(text) => Arc::from(text),
        Err(e) => {
            warn!(event = delivery.event.name(), error = %e, "failed to encode delivery");
            return;
        }
    };

    debug!(
        event = delivery.event.name(),
        recipients = delivery.recipients.len(),
        "routing"
    );

    for recipient in &delivery.recipients {
        if let Some(tx) = clients.get(recipient) {
            let _ = tx.send(frame.clone());
        }
    }
}

//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections.
//! - Assigns each connection a `ConnectionId`.
//! - Spawns:
//!   - a per-connection task to handle I/O,
//!   - a single central hub task that owns `RealtimeHub`.
//!
//! The actual per-connection logic and hub loop live in `client`
//! and `hub_task` modules respectively.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dashmap::DashMap;
use hub_core::{ConnectionEvent, ConnectionId};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::client;
use crate::config::Config;
use crate::hub_task;
use crate::types::{ClientRegistry, HubRequest, HubRx, HubTx, OutboundRx, OutboundTx};

/// Bind the configured address and serve forever.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.socket_addr_string();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "listening");

    serve(listener, config).await
}

/// Serve connections from an already-bound listener.
pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
    // Shared registry of clients → outbound channels.
    let clients: ClientRegistry = Arc::new(DashMap::new());

    // Channel from connection tasks → hub task.
    let (hub_tx, hub_rx): (HubTx, HubRx) = mpsc::unbounded_channel();

    // Spawn the central hub task.
    {
        let clients_clone = clients.clone();
        tokio::spawn(async move {
            hub_task::run_hub_loop(hub_rx, clients_clone).await;
        });
    }

    let allowed_origin: Arc<str> = Arc::from(config.client_url.as_str());
    let mut next_id: u64 = 1;

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                // Usually fd exhaustion; back off instead of spinning.
                error!(error = %e, "accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };

        if clients.len() >= config.max_clients {
            warn!(
                %peer_addr,
                max_clients = config.max_clients,
                "rejecting connection: max_clients reached"
            );
            // Just drop the stream; client will see the connection closed.
            continue;
        }

        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer_addr, error = %e, "could not set TCP_NODELAY");
        }

        let client_id = ConnectionId(next_id);
        next_id += 1;
        info!(client = %client_id, %peer_addr, "accepted connection");

        // Create outbound channel for this client.
        let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

        // Register client, then tell the hub before any of its frames can
        // be read.
        clients.insert(client_id, out_tx);
        hub_tx
            .send(HubRequest {
                client_id,
                event: ConnectionEvent::Opened,
            })
            .context("hub task stopped")?;

        let clients_clone = clients.clone();
        let hub_tx_clone = hub_tx.clone();
        let origin_clone = allowed_origin.clone();

        tokio::spawn(async move {
            match client::run_client(
                client_id,
                stream,
                hub_tx_clone,
                out_rx,
                clients_clone,
                origin_clone,
            )
            .await
            {
                Ok(()) => info!(client = %client_id, "disconnected"),
                Err(e) => info!(client = %client_id, error = %e, "disconnected with error"),
            }
        });
    }
}

// crates/hub-server/src/client.rs
// Handles BOTH WebSocket (browsers) and newline-delimited JSON (tools) clients.

use std::sync::Arc;

use anyhow::Context;
use futures::{SinkExt, StreamExt};
use hub_core::{ConnectionEvent, ConnectionId};
use hub_protocol::line_codec::to_line;
use hub_protocol::wire_types::MAX_FRAME_LEN;
use hub_protocol::{decode_input, LineFramer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::types::{ClientRegistry, HubRequest, HubTx, OutboundRx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transport {
    WebSocket,
    Lines,
}

/// Run the I/O loop for a single connection, then clean it up.
///
/// Cleanup is identical whatever ended the connection (EOF, read error,
/// close frame, failed handshake, write failure): the client leaves the
/// registry and the hub is told the connection closed.
pub async fn run_client(
    client_id: ConnectionId,
    stream: TcpStream,
    hub_tx: HubTx,
    out_rx: OutboundRx,
    clients: ClientRegistry,
    allowed_origin: Arc<str>,
) -> anyhow::Result<()> {
    let transport = detect_transport(&stream).await;
    debug!(client = %client_id, ?transport, "transport detected");

    let result = match transport {
        Transport::WebSocket => {
            run_ws_client(client_id, stream, &hub_tx, out_rx, &allowed_origin).await
        }
        Transport::Lines => run_line_client(client_id, stream, &hub_tx, out_rx).await,
    };

    clients.remove(&client_id);
    let _ = hub_tx.send(HubRequest {
        client_id,
        event: ConnectionEvent::Closed,
    });

    result
}

/// Peek at the first byte: an HTTP upgrade starts with `GET`, JSON frames
/// start with `{` (or whitespace).
async fn detect_transport(stream: &TcpStream) -> Transport {
    let mut first_byte = [0u8; 1];
    match stream.peek(&mut first_byte).await {
        Ok(n) if n > 0 && first_byte[0] == b'G' => Transport::WebSocket,
        _ => Transport::Lines,
    }
}

/// Decode one text frame and forward it to the hub. Malformed frames are
/// dropped; the connection stays open.
///
/// Returns `false` once the hub is gone.
fn forward_frame(client_id: ConnectionId, text: &str, hub_tx: &HubTx) -> bool {
    match decode_input(text) {
        Ok(event) => hub_tx
            .send(HubRequest {
                client_id,
                event: ConnectionEvent::Inbound(event),
            })
            .is_ok(),
        Err(e) => {
            debug!(client = %client_id, error = %e, "dropping frame");
            true
        }
    }
}

// -----------------------------------------------------------------------------
// Newline-delimited JSON over raw TCP
// -----------------------------------------------------------------------------

async fn run_line_client(
    client_id: ConnectionId,
    stream: TcpStream,
    hub_tx: &HubTx,
    mut out_rx: OutboundRx,
) -> anyhow::Result<()> {
    let (read_stream, mut write_stream) = stream.into_split();

    // Writer task: consume encoded frames and write them as lines.
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = write_line(&mut write_stream, &frame).await {
                debug!(client = %client_id, error = %e, "write failed");
                break;
            }
        }
    });

    let result = tokio::select! {
        res = read_lines(client_id, read_stream, hub_tx) => res,
        _ = &mut writer => Ok(()),
    };

    writer.abort();
    result
}

async fn read_lines(
    client_id: ConnectionId,
    mut read_stream: OwnedReadHalf,
    hub_tx: &HubTx,
) -> anyhow::Result<()> {
    let mut framer = LineFramer::new();
    let mut temp_buf = [0u8; 4096];

    loop {
        let n = read_stream
            .read(&mut temp_buf)
            .await
            .with_context(|| format!("client {} read error", client_id))?;

        if n == 0 {
            // EOF - client disconnected
            return Ok(());
        }

        framer.extend(&temp_buf[..n]);

        while let Some(frame) = framer.next_frame() {
            match frame {
                Ok(text) => {
                    if !forward_frame(client_id, &text, hub_tx) {
                        return Ok(());
                    }
                }
                Err(e) => debug!(client = %client_id, error = %e, "dropping frame"),
            }
        }
    }
}

async fn write_line(stream: &mut OwnedWriteHalf, frame: &str) -> std::io::Result<()> {
    stream.write_all(to_line(frame).as_bytes()).await?;
    stream.flush().await
}

// -----------------------------------------------------------------------------
// WebSocket (JSON text messages)
// -----------------------------------------------------------------------------

async fn run_ws_client(
    client_id: ConnectionId,
    stream: TcpStream,
    hub_tx: &HubTx,
    mut out_rx: OutboundRx,
    allowed_origin: &Arc<str>,
) -> anyhow::Result<()> {
    let allowed = allowed_origin.clone();
    // Same ceiling as the line transport; oversized messages end the connection.
    let config = WebSocketConfig::default()
        .max_message_size(Some(MAX_FRAME_LEN))
        .max_frame_size(Some(MAX_FRAME_LEN));
    let ws_stream = tokio_tungstenite::accept_hdr_async_with_config(
        stream,
        move |req: &Request, response: Response| check_origin(req, response, &allowed),
        Some(config),
    )
    .await
    .with_context(|| format!("client {} websocket handshake failed", client_id))?;

    info!(client = %client_id, "websocket established");

    let (mut sink, mut source) = ws_stream.split();

    let mut writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(e) = sink.send(Message::text(frame.to_string())).await {
                debug!(client = %client_id, error = %e, "write failed");
                break;
            }
        }
        let _ = sink.close().await;
    });

    let read_loop = async {
        while let Some(msg) = source.next().await {
            match msg.with_context(|| format!("client {} read error", client_id))? {
                Message::Text(text) => {
                    if !forward_frame(client_id, text.as_str(), hub_tx) {
                        break;
                    }
                }
                Message::Close(_) => break,
                Message::Binary(_) => {
                    debug!(client = %client_id, "dropping binary frame");
                }
                // Pings are answered by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok::<(), anyhow::Error>(())
    };

    let result = tokio::select! {
        res = read_loop => res,
        _ = &mut writer => Ok(()),
    };

    writer.abort();
    result
}

/// Reject browser handshakes whose `Origin` is not the configured client.
///
/// Requests without an `Origin` header (non-browser tools) are accepted.
fn check_origin(
    req: &Request,
    response: Response,
    allowed: &str,
) -> Result<Response, ErrorResponse> {
    let Some(origin) = req.headers().get("origin") else {
        return Ok(response);
    };

    let origin = origin.to_str().unwrap_or_default();
    if origin_allowed(origin, allowed) {
        Ok(response)
    } else {
        warn!(origin, allowed, "rejecting websocket handshake");
        let mut rejection = ErrorResponse::new(Some("origin not allowed".to_string()));
        *rejection.status_mut() = StatusCode::FORBIDDEN;
        Err(rejection)
    }
}

fn origin_allowed(origin: &str, allowed: &str) -> bool {
    allowed == "*"
        || origin
            .trim_end_matches('/')
            .eq_ignore_ascii_case(allowed.trim_end_matches('/'))
}

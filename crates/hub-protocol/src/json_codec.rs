//! JSON envelope codec.
//!
//! Every frame, in either direction, is one JSON object:
//!
//! ```text
//! {"event": "<name>", "data": <payload>}
//! ```
//!
//! `data` may be omitted on input, in which case it is `null` (and the
//! event will then fail payload shaping unless it needs no fields).
//!
//! NOTE: This module handles **one frame per string**. Splitting a byte
//! stream into frames is the job of [`crate::line_codec`] or of the
//! WebSocket layer.

use hub_core::{EventError, InboundEvent, OutboundEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::wire_types::{validate_frame_len, MAX_FRAME_LEN};

/// Errors that can arise when decoding or encoding a frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not valid JSON, or not an object with a string `event`.
    #[error("malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    /// Larger than [`MAX_FRAME_LEN`].
    #[error("frame of {0} bytes exceeds the {} byte limit", MAX_FRAME_LEN)]
    FrameTooLarge(usize),

    /// A newline-framed line that is not valid UTF-8.
    #[error("frame is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Well-formed envelope whose event is unknown or whose payload is
    /// missing required fields.
    #[error(transparent)]
    Event(#[from] EventError),
}

/// A decoded envelope, before payload shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,

    #[serde(default)]
    pub data: Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Frame {
            event: event.into(),
            data,
        }
    }
}

// ============================================================================
// INPUT: client → server
// ============================================================================

/// Decode one envelope without interpreting the event.
pub fn decode_frame(text: &str) -> Result<Frame, ProtocolError> {
    if !validate_frame_len(text.len()) {
        return Err(ProtocolError::FrameTooLarge(text.len()));
    }
    Ok(serde_json::from_str(text)?)
}

/// Decode one envelope into a validated inbound event.
pub fn decode_input(text: &str) -> Result<InboundEvent, ProtocolError> {
    let frame = decode_frame(text)?;
    Ok(InboundEvent::from_wire(&frame.event, frame.data)?)
}

/// Encode an inbound event (used by clients and tests).
pub fn encode_input(event: &InboundEvent) -> Result<String, ProtocolError> {
    encode_frame(&Frame::new(event.name(), event.data()))
}

// ============================================================================
// OUTPUT: server → client
// ============================================================================

/// Encode an outbound event as a single-line JSON envelope.
pub fn encode_output(event: &OutboundEvent) -> Result<String, ProtocolError> {
    encode_frame(&Frame::new(event.name(), event.payload()))
}

fn encode_frame(frame: &Frame) -> Result<String, ProtocolError> {
    // serde_json never emits raw newlines in compact mode, so the result is
    // always safe to newline-frame.
    Ok(serde_json::to_string(frame)?)
}

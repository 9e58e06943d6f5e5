//! hub-protocol
//!
//! Wire-level encoding/decoding for the collaboration hub.
//!
//! This crate turns logical hub events (`hub_core::InboundEvent` /
//! `OutboundEvent`) into text frames and back again.
//!
//! - [`json_codec`]  : the `{"event", "data"}` JSON envelope
//! - [`line_codec`]  : newline framing for raw TCP clients
//! - [`wire_types`]  : limits shared by both

pub mod wire_types;
pub mod json_codec;
pub mod line_codec;

pub use json_codec::{
    ProtocolError,
    Frame,
    decode_frame,
    decode_input,
    encode_input,
    encode_output,
};

pub use line_codec::LineFramer;

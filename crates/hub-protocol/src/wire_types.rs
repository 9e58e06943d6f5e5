//! Limits shared by every framing.

/// Maximum size of a single frame, in bytes.
///
/// Applies to newline-delimited frames and WebSocket text messages alike.
/// Anything larger is dropped before JSON parsing.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Whether a frame of `len` bytes is within limits.
pub fn validate_frame_len(len: usize) -> bool {
    len <= MAX_FRAME_LEN
}

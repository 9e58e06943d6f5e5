//! Newline framing for raw TCP clients.
//!
//! Each frame is one line of UTF-8 JSON terminated by `\n` (a trailing
//! `\r` is tolerated). Blank lines are skipped; a line that is not valid
//! UTF-8 is reported as [`ProtocolError::InvalidUtf8`] and skipped.
//!
//! A line longer than the frame limit is reported once as
//! [`ProtocolError::FrameTooLarge`] and then discarded up to and including
//! its terminating newline, so one oversized frame never poisons the
//! frames after it.

use bytes::BytesMut;

use crate::json_codec::ProtocolError;
use crate::wire_types::MAX_FRAME_LEN;

/// Incremental line splitter over a growing byte buffer.
#[derive(Debug)]
pub struct LineFramer {
    buffer: BytesMut,
    max_len: usize,

    /// Dropping the tail of an oversized line until the next `\n`.
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        LineFramer::with_max_len(MAX_FRAME_LEN)
    }
}

impl LineFramer {
    pub fn new() -> Self {
        LineFramer::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        LineFramer {
            buffer: BytesMut::with_capacity(4096),
            max_len,
            discarding: false,
        }
    }

    /// Append bytes read from the socket.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pop the next complete frame, if any.
    ///
    /// Returns `None` when more bytes are needed.
    pub fn next_frame(&mut self) -> Option<Result<String, ProtocolError>> {
        loop {
            let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') else {
                if self.buffer.len() > self.max_len {
                    let len = self.buffer.len();
                    self.buffer.clear();
                    if !self.discarding {
                        self.discarding = true;
                        return Some(Err(ProtocolError::FrameTooLarge(len)));
                    }
                }
                return None;
            };

            let line = self.buffer.split_to(newline_pos + 1);
            if self.discarding {
                self.discarding = false;
                continue;
            }

            let body = &line[..newline_pos];
            if body.len() > self.max_len {
                return Some(Err(ProtocolError::FrameTooLarge(body.len())));
            }

            let text = match std::str::from_utf8(body) {
                Ok(text) => text.trim(),
                Err(e) => return Some(Err(ProtocolError::InvalidUtf8(e))),
            };
            if text.is_empty() {
                continue;
            }
            return Some(Ok(text.to_string()));
        }
    }

    /// Bytes buffered but not yet framed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// Terminate an encoded frame for the line transport.
pub fn to_line(frame: &str) -> String {
    let mut line = String::with_capacity(frame.len() + 1);
    line.push_str(frame);
    line.push('\n');
    line
}

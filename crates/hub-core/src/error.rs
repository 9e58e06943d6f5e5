//! Error types for inbound event shaping.
//!
//! None of these are fatal: the hub drops the offending event and
//! carries on. They exist so the transport layer can log *why* a frame
//! was dropped.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    /// The event name is not part of the inbound catalog.
    #[error("unknown event `{0}`")]
    UnknownEvent(String),

    /// A required field is absent, empty, or of the wrong JSON type.
    #[error("`{event}` payload is missing `{field}`")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

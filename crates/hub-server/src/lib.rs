//! hub-server
//!
//! Multi-client async server for the real-time collaboration hub.

pub mod config;
pub mod types;
pub mod server;

// these are internal modules, not re-exported
mod client;
mod hub_task;

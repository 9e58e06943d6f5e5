//! Configuration for the hub server.
//!
//! Defaults can be overridden via environment variables (optionally
//! loaded from a `.env` file by the binary):
//!
//! - `HUB_BIND_ADDR`   (default: "0.0.0.0")
//! - `PORT`            (default: "3001")
//! - `CLIENT_URL`      (default: "http://localhost:3000")
//! - `HUB_MAX_CLIENTS` (default: "1024")

use std::env;
use std::str::FromStr;

use anyhow::Context;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on.
    pub port: u16,

    /// Origin allowed to open WebSocket connections. `*` allows any.
    pub client_url: String,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 3001,
            client_url: "http://localhost:3000".to_string(),
            max_clients: 1024,
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Config::default();

        Ok(Config {
            bind_addr: env::var("HUB_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: read_env_or_default("PORT", defaults.port)?,
            client_url: env::var("CLIENT_URL").unwrap_or(defaults.client_url),
            max_clients: read_env_or_default("HUB_MAX_CLIENTS", defaults.max_clients)?,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {}: {:?}", key, val)),
        Err(_) => Ok(default),
    }
}

//! Real-time collaboration hub server.

use clap::Parser;
use hub_server::config::Config;
use hub_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hub-server")]
#[command(about = "Presence and live-update hub for project boards")]
struct Cli {
    /// Interface to bind (overrides HUB_BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Origin allowed to open WebSocket connections (overrides CLIENT_URL)
    #[arg(long)]
    client_url: Option<String>,

    /// Maximum simultaneous connections (overrides HUB_MAX_CLIENTS)
    #[arg(long)]
    max_clients: Option<usize>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(client_url) = self.client_url {
            config.client_url = client_url;
        }
        if let Some(max_clients) = self.max_clients {
            config.max_clients = max_clients;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    cli.apply(&mut config);

    info!(
        bind = %config.bind_addr,
        port = config.port,
        client_url = %config.client_url,
        max_clients = config.max_clients,
        "starting hub-server"
    );

    tokio::select! {
        res = server::run(config) => res,
        _ = tokio::signal::ctrl_c() => {
            info!("ctrl-c received, shutting down");
            Ok(())
        }
    }
}

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use followup::api::server::start_server;
use followup::config;
use followup::core_state::CoreState;

const DEFAULT_PORT: u16 = 8787;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{} starting", config::APP_NAME, config::APP_VERSION);

    // State (including the blocking HTTP client) is built before the
    // async runtime starts.
    let core = Arc::new(CoreState::initialize()?);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(core))
}

async fn run(core: Arc<CoreState>) -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::var("FOLLOWUP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let mut server = start_server(core, IpAddr::V4(Ipv4Addr::LOCALHOST), port).await?;
    tracing::info!(addr = %server.addr, "Listening");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    server.shutdown();

    Ok(())
}

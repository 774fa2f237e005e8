use anyhow::Result;
use cashierd::config;
use cashierd::server::DaemonServer;
use cashierd::state::DaemonState;
use std::sync::Arc;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::INFO)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(LevelFilter::INFO.into()))
        .init();

    info!("Virtual cashier daemon (cashierd) starting...");

    let config = config::load_config()?;
    let socket_path = config.server.socket_path();
    let state = Arc::new(DaemonState::start(config)?);

    let server = DaemonServer::new(socket_path, Arc::clone(&state));
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Socket server failed: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    state.shutdown().await;
    Ok(())
}

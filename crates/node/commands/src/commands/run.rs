//! Run command - start the engine and serve peers.
//!
//! This command:
//!
//! - Loads configuration from defaults, env, config file, and CLI
//! - Initializes and starts the V2Ray backend
//! - Periodically logs peer statistics
//! - Stops the backend on Ctrl+C

use crate::{cli::NodeArgs, config::NodeConfig};
use dvpn_node_core::dirs::DataDirs;
use dvpn_service_types::ServerService;
use dvpn_v2ray::V2RayServer;
use eyre::{Result, WrapErr};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Run the node command.
pub async fn run(args: NodeArgs) -> Result<()> {
    let dirs = DataDirs::new(&args.datadir)?;
    info!("Data directory: {}", dirs.root.display());

    let config = NodeConfig::load(Some(&dirs.config_file()), &args)?;
    let server_config = config.v2ray.server_config(&dirs.v2ray);
    info!(
        exec = %server_config.exec.display(),
        api = %server_config.api_addr,
        port = server_config.info.port,
        transport = %server_config.info.transport,
        "V2Ray backend"
    );

    let server = V2RayServer::new(server_config).wrap_err("failed to create V2Ray server")?;
    server.init().wrap_err("failed to initialize V2Ray server")?;
    server.start().await.wrap_err("failed to start V2Ray server")?;

    info!("Serving peers... (press Ctrl+C to stop)");
    let served = serve(&server, config.stats_interval()).await;

    server.stop().await.wrap_err("failed to stop V2Ray server")?;
    info!(peers = server.peer_count(), "Node shutdown complete");
    served
}

/// Wait for Ctrl+C, reporting statistics every `interval` if set.
async fn serve<S: ServerService>(server: &S, interval: Option<Duration>) -> Result<()> {
    let Some(period) = interval else {
        tokio::signal::ctrl_c()
            .await
            .wrap_err("failed to listen for shutdown signal")?;
        info!("Received shutdown signal");
        return Ok(());
    };

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.wrap_err("failed to listen for shutdown signal")?;
                info!("Received shutdown signal");
                return Ok(());
            }
            _ = ticker.tick() => report(server).await,
        }
    }
}

async fn report<S: ServerService>(server: &S) {
    match server.peer_statistics().await {
        Ok(stats) => {
            let (upload, download) = stats
                .iter()
                .fold((0i64, 0i64), |(up, down), s| (up + s.upload, down + s.download));
            info!(peers = server.peer_count(), upload, download, "Peer statistics");
            for s in &stats {
                debug!(key = %s.key, upload = s.upload, download = s.download, "peer traffic");
            }
        }
        Err(e) => warn!("Failed to collect peer statistics: {}", e),
    }
}

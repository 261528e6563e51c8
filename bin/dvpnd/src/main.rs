//! dvpn node daemon.

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dvpn_node_commands::run().await
}

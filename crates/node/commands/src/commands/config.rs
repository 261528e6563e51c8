//! Config command - print the effective node configuration.

use crate::{cli::NodeArgs, config::NodeConfig};
use dvpn_node_core::dirs::DataDirs;
use eyre::Result;
use tracing::debug;

/// Run the config command.
pub async fn run(args: NodeArgs) -> Result<()> {
    let dirs = DataDirs::resolve(&args.datadir);
    let config_path = dirs.config_file();
    debug!(path = %config_path.display(), exists = config_path.exists(), "config file");

    let config = NodeConfig::load(Some(&config_path), &args)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

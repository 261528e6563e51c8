//! Entry point and subcommands of the `dvpnd` daemon.
//!
//! `run` brings the V2Ray backend up and serves peers until Ctrl+C;
//! `config` prints the configuration `run` would use. Both resolve settings
//! through [`NodeConfig::load`], where later layers override earlier ones:
//! built-in defaults, `DVPN_*` environment variables (sections joined with
//! `__`), the TOML config file, then flags given on the command line.

mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, NodeArgs};
pub use config::NodeConfig;

use clap::Parser;
use color_eyre::eyre;
use dvpn_node_core::{logging, version};
use tracing::info;

/// Parse `std::env::args`, install error reporting and logging, then
/// dispatch to the selected subcommand.
pub async fn run() -> eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logging(&cli.logs)?;

    info!(version = version::VERSION, "starting {}", version::NAME);

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await?,
        Commands::Config(args) => commands::config::run(args).await?,
    }

    Ok(())
}

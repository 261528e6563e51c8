//! Data directory CLI arguments.

use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Data directory configuration.
#[derive(Debug, Args, Clone, Default, Serialize, Deserialize)]
#[command(next_help_heading = "Datadir")]
#[serde(default)]
pub struct DataDirArgs {
    /// Root directory for node data (config file and engine home).
    #[arg(long, env = "DVPN_DATADIR", value_name = "PATH")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datadir: Option<PathBuf>,

    /// Node configuration file. Defaults to `<datadir>/config.toml`.
    #[arg(long, value_name = "FILE")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PathBuf>,
}

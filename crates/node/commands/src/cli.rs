//! CLI argument assembly and top-level parser.

use clap::{Args, Parser, Subcommand};

pub(crate) use dvpn_node_core::args::{DataDirArgs, LogArgs, V2RayArgs};

/// dvpn node daemon serving peers through a V2Ray engine.
#[derive(Debug, Parser)]
#[command(name = "dvpnd", author, version, about, long_about = None)]
pub struct Cli {
    /// Logging configuration.
    #[command(flatten)]
    pub logs: LogArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Node commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the engine and serve peers until interrupted.
    Run(NodeArgs),
    /// Print the effective configuration as TOML.
    Config(NodeArgs),
}

/// Arguments shared by the node commands.
#[derive(Debug, Clone, Args)]
pub struct NodeArgs {
    /// Data directory configuration.
    #[command(flatten)]
    pub datadir: DataDirArgs,

    /// V2Ray backend configuration.
    #[command(flatten)]
    pub v2ray: V2RayArgs,

    /// Seconds between peer statistics reports; 0 disables reporting.
    #[arg(long = "stats-interval", value_name = "SECS")]
    pub stats_interval_secs: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from([
            "dvpnd",
            "-v",
            "run",
            "--datadir",
            "/srv/dvpn",
            "--v2ray.port",
            "443",
            "--stats-interval",
            "0",
        ]);
        assert_eq!(cli.logs.verbosity, 1);

        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.datadir.datadir, Some(PathBuf::from("/srv/dvpn")));
        assert_eq!(args.v2ray.port, Some(443));
        assert_eq!(args.stats_interval_secs, Some(0));
    }

    #[test]
    fn test_parse_config_with_global_log_flags() {
        let cli = Cli::parse_from(["dvpnd", "config", "--quiet"]);
        assert!(cli.logs.quiet);
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}

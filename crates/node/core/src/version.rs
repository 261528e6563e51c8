//! Version information for the dvpn node.

/// The version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name reported in logs and `--version` output.
pub const NAME: &str = "dvpnd";

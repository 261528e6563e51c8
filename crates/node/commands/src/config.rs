//! Figment-based configuration loading.
//!
//! Configuration priority (highest wins):
//! 1. CLI arguments
//! 2. Config file (TOML)
//! 3. Environment variables (`DVPN_` prefix, e.g. `DVPN_V2RAY__PORT=443`)
//! 4. Defaults

use crate::cli::{NodeArgs, V2RayArgs};
use eyre::{Result, WrapErr, eyre};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Default number of seconds between peer statistics reports.
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 60;

/// Complete node configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Seconds between peer statistics reports; 0 disables reporting.
    pub stats_interval_secs: u64,

    /// V2Ray backend configuration.
    pub v2ray: V2RayArgs,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
            v2ray: V2RayArgs::default(),
        }
    }
}

/// The layer contributed by the command line. Unset flags serialize to
/// nothing and leave lower layers alone.
#[derive(Serialize)]
struct CliOverrides<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    stats_interval_secs: Option<u64>,
    v2ray: &'a V2RayArgs,
}

impl NodeConfig {
    /// Load configuration from defaults, environment, config file and CLI.
    ///
    /// A missing config file is not an error.
    pub fn load(config_path: Option<&Path>, args: &NodeArgs) -> Result<Self> {
        let mut figment = Figment::new()
            .merge(Serialized::defaults(NodeConfig::default()))
            .merge(Env::prefixed("DVPN_").split("__"));

        if let Some(path) = config_path {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment
            .merge(Serialized::defaults(CliOverrides {
                stats_interval_secs: args.stats_interval_secs,
                v2ray: &args.v2ray,
            }))
            .extract::<Self>()
            .wrap_err("Failed to load configuration")?
            .validated()
    }

    fn validated(self) -> Result<Self> {
        self.v2ray
            .validate()
            .map_err(|reason| eyre!("Invalid configuration: {reason}"))?;
        Ok(self)
    }

    /// Interval between statistics reports, if enabled.
    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }

    /// Render as a TOML document.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).wrap_err("Failed to serialize configuration")
    }
}

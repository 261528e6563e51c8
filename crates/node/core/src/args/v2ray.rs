//! V2Ray backend CLI arguments.

use clap::Args;
use dvpn_v2ray::{
    DEFAULT_API_ADDR, DEFAULT_EXEC, DEFAULT_REQUEST_TIMEOUT, ServerInfo, Transport,
    V2RayServerConfig,
};
use serde::{Deserialize, Serialize};
use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

/// V2Ray backend configuration.
///
/// Every field is optional so that only flags given on the command line
/// override lower configuration layers. [`Default`] fills in the engine
/// defaults.
#[derive(Debug, Args, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[command(next_help_heading = "V2Ray")]
#[serde(default)]
pub struct V2RayArgs {
    /// Engine executable.
    #[arg(long = "v2ray.exec", value_name = "PATH")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec: Option<PathBuf>,

    /// Address of the engine's gRPC management API.
    #[arg(long = "v2ray.api-addr", value_name = "ADDR")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_addr: Option<SocketAddr>,

    /// Deadline for each management API call, in milliseconds.
    #[arg(
        long = "v2ray.request-timeout",
        value_name = "MS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Inbound port advertised to clients.
    #[arg(long = "v2ray.port", value_name = "PORT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Inbound transport advertised to clients (tcp, mkcp, websocket, grpc, ...).
    #[arg(long = "v2ray.transport", value_name = "NAME")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
}

impl Default for V2RayArgs {
    fn default() -> Self {
        Self {
            exec: Some(PathBuf::from(DEFAULT_EXEC)),
            api_addr: Some(DEFAULT_API_ADDR),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT.as_millis() as u64),
            port: Some(0),
            transport: Some(Transport::Unspecified),
        }
    }
}

impl V2RayArgs {
    /// Arguments with nothing set, as parsed from an empty command line.
    pub fn unset() -> Self {
        Self {
            exec: None,
            api_addr: None,
            request_timeout_ms: None,
            port: None,
            transport: None,
        }
    }

    /// Reject values that would make the backend unusable.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_ms == Some(0) {
            return Err("v2ray.request_timeout_ms must be greater than zero".into());
        }
        Ok(())
    }

    /// Build the server configuration rooted at `home_dir`.
    pub fn server_config(&self, home_dir: &Path) -> V2RayServerConfig {
        let mut config = V2RayServerConfig::new(home_dir);
        if let Some(exec) = &self.exec {
            config = config.with_exec(exec);
        }
        if let Some(addr) = self.api_addr {
            config = config.with_api_addr(addr);
        }
        if let Some(ms) = self.request_timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        config.with_info(ServerInfo::new(
            self.port.unwrap_or_default(),
            self.transport.unwrap_or_default(),
        ))
    }
}

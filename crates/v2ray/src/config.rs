//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ServerInfo;

/// Name of the engine configuration file inside the home directory.
pub const CONFIG_FILENAME: &str = "v2ray_config.json";

/// Engine executable, resolved through `PATH`.
pub const DEFAULT_EXEC: &str = "v2ray";

/// Loopback address of the engine's management API.
pub const DEFAULT_API_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 23));

/// Deadline for a single control-plane call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for [`V2RayServer`](crate::V2RayServer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct V2RayServerConfig {
    /// Directory holding the engine configuration.
    pub home_dir: PathBuf,
    /// Engine executable.
    pub exec: PathBuf,
    /// Engine management API address.
    pub api_addr: SocketAddr,
    /// Deadline for each control-plane call.
    pub request_timeout: Duration,
    /// Advertised inbound port and transport.
    pub info: ServerInfo,
}

impl V2RayServerConfig {
    pub fn new(home_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            exec: PathBuf::from(DEFAULT_EXEC),
            api_addr: DEFAULT_API_ADDR,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            info: ServerInfo::default(),
        }
    }

    pub fn with_exec(mut self, exec: impl Into<PathBuf>) -> Self {
        self.exec = exec.into();
        self
    }

    pub fn with_api_addr(mut self, addr: SocketAddr) -> Self {
        self.api_addr = addr;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_info(mut self, info: ServerInfo) -> Self {
        self.info = info;
        self
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    /// Path of the engine configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.home_dir.join(CONFIG_FILENAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = V2RayServerConfig::new("/var/lib/dvpn/v2ray");
        assert_eq!(
            config.config_file(),
            PathBuf::from("/var/lib/dvpn/v2ray/v2ray_config.json")
        );
        assert_eq!(config.api_addr.to_string(), "127.0.0.1:23");
        assert_eq!(config.exec, PathBuf::from("v2ray"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}

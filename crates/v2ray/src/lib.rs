//! V2Ray server backend for dvpn nodes.
//!
//! The backend provisions peers on an out-of-process V2Ray engine:
//!
//! - [`Identity`] - the 17-byte identity buffer and the registry key derived from it
//! - [`Proxy`] / [`Transport`] - closed descriptors of the engine's inbound protocols
//! - [`ControlPlane`] / [`GrpcControlPlane`] - user add/remove and traffic counters
//!   over the engine's gRPC management API
//! - [`ProcessSupervisor`] - owns the engine process
//! - [`V2RayServer`] - the [`ServerService`](dvpn_service_types::ServerService)
//!   implementation composing the above with a [`PeerRegistry`](dvpn_peers::PeerRegistry)
//!
//! # Usage
//!
//! ```ignore
//! use dvpn_service_types::ServerService;
//! use dvpn_v2ray::{V2RayServer, V2RayServerConfig};
//!
//! let server = V2RayServer::new(V2RayServerConfig::new("/var/lib/dvpn/v2ray"))?;
//! server.init()?;
//! server.start().await?;
//! server.add_peer(&identity).await?;
//! ```

mod config;
mod control;
mod error;
mod identity;
mod info;
mod process;
pub mod proto;
mod proxy;
mod server;
mod transport;

pub use config::{
    CONFIG_FILENAME, DEFAULT_API_ADDR, DEFAULT_EXEC, DEFAULT_REQUEST_TIMEOUT, V2RayServerConfig,
};
pub use control::{
    ControlError, ControlPlane, GrpcControlPlane, downlink_counter, is_not_found, uplink_counter,
};
pub use error::V2RayError;
pub use identity::{IDENTITY_LEN, Identity, IdentityError, decode_key, peer_key};
pub use info::{INFO_LEN, ServerInfo};
pub use process::{EngineProcess, ProcessError, ProcessStatus, ProcessSupervisor};
pub use proxy::Proxy;
pub use server::{ServerState, V2RayServer};
pub use transport::Transport;

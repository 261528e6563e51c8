//! V2Ray implementation of [`ServerService`].

use std::fs;
use std::sync::Arc;

use async_trait::async_trait;
use dvpn_peers::{Peer, PeerRegistry};
use dvpn_service_types::{PeerStatistic, ServerService, ServiceType};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::{
    ControlPlane, EngineProcess, GrpcControlPlane, Identity, IdentityError, ProcessError,
    ProcessStatus, ProcessSupervisor, V2RayError, V2RayServerConfig, downlink_counter, peer_key,
    uplink_counter,
};

/// Lifecycle of a [`V2RayServer`]. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServerState {
    #[default]
    Uninitialized,
    Initialized,
    Running,
    Stopped,
}

/// Server backend provisioning peers on a V2Ray engine.
///
/// Peers are identified by the 17-byte buffer described in [`Identity`].
/// The engine is the source of truth for which users exist; the registry
/// mirrors what this server successfully added.
pub struct V2RayServer<C = GrpcControlPlane, P = ProcessSupervisor> {
    config: V2RayServerConfig,
    control: C,
    process: P,
    peers: Arc<PeerRegistry>,
    state: RwLock<ServerState>,
}

impl V2RayServer {
    /// Create a server talking gRPC to an engine it spawns itself.
    pub fn new(config: V2RayServerConfig) -> Result<Self, V2RayError> {
        let control = GrpcControlPlane::new(config.api_addr, config.request_timeout)?;
        let process = ProcessSupervisor::new(&config.exec, config.config_file());
        Ok(Self::with_components(
            config,
            control,
            process,
            Arc::new(PeerRegistry::new()),
        ))
    }
}

impl<C: ControlPlane, P: EngineProcess> V2RayServer<C, P> {
    pub fn with_components(
        config: V2RayServerConfig,
        control: C,
        process: P,
        peers: Arc<PeerRegistry>,
    ) -> Self {
        Self {
            config,
            control,
            process,
            peers,
            state: RwLock::new(ServerState::Uninitialized),
        }
    }

    pub fn config(&self) -> &V2RayServerConfig {
        &self.config
    }

    pub fn state(&self) -> ServerState {
        *self.state.read()
    }

    pub fn peers(&self) -> &Arc<PeerRegistry> {
        &self.peers
    }

    pub fn process(&self) -> &P {
        &self.process
    }

    fn ensure_running(&self, op: &'static str) -> Result<(), V2RayError> {
        match self.state() {
            ServerState::Running => Ok(()),
            state => Err(V2RayError::NotRunning { op, state }),
        }
    }
}

#[async_trait]
impl<C: ControlPlane, P: EngineProcess> ServerService for V2RayServer<C, P> {
    type Error = V2RayError;

    fn init(&self) -> Result<(), V2RayError> {
        fs::create_dir_all(self.config.home_dir())?;

        let config_file = self.config.config_file();
        if !config_file.exists() {
            warn!(
                path = %config_file.display(),
                "engine config not found; it must be written before start"
            );
        }

        let mut state = self.state.write();
        if *state == ServerState::Uninitialized {
            *state = ServerState::Initialized;
            info!(home = %self.config.home_dir().display(), "initialized v2ray server");
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), V2RayError> {
        let mut state = self.state.write();
        if *state != ServerState::Initialized {
            return Err(V2RayError::InvalidState {
                op: "start",
                state: *state,
            });
        }

        let config_file = self.config.config_file();
        if !config_file.exists() {
            return Err(V2RayError::ConfigMissing(config_file));
        }

        self.process.start()?;
        *state = ServerState::Running;
        info!(api = %self.config.api_addr, "v2ray server running");
        Ok(())
    }

    async fn stop(&self) -> Result<(), V2RayError> {
        // Claim the transition under the lock so only one caller stops the engine.
        {
            let mut state = self.state.write();
            match *state {
                ServerState::Running => *state = ServerState::Stopped,
                ServerState::Stopped => {
                    return Err(V2RayError::InvalidState {
                        op: "stop",
                        state: ServerState::Stopped,
                    });
                }
                _ => return Err(ProcessError::NotStarted.into()),
            }
        }

        if let Err(err) = self.process.stop().await {
            // Stay `Running` only while the engine process still is.
            if self.process.status() == ProcessStatus::Running {
                *self.state.write() = ServerState::Running;
            }
            warn!(%err, "failed to stop engine process");
            return Err(err.into());
        }

        info!(peers = self.peers.len(), "v2ray server stopped");
        Ok(())
    }

    async fn add_peer(&self, data: &[u8]) -> Result<Vec<u8>, V2RayError> {
        let identity = Identity::decode(data)?;
        self.ensure_running("add peer")?;

        let proxy = identity.proxy();
        let account = proxy
            .account(identity.id())
            .ok_or(IdentityError::UnsupportedProxy(proxy.into()))?;
        let key = identity.key();

        self.control.add_user(proxy.tag(), &key, account).await?;

        // Only reached once the engine accepted the user.
        self.peers.put(Peer::new(key.clone()));
        info!(%key, %proxy, peers = self.peers.len(), "added peer");
        Ok(Vec::new())
    }

    fn has_peer(&self, data: &[u8]) -> Result<bool, V2RayError> {
        let key = peer_key(data)?;
        Ok(self.peers.contains(&key))
    }

    async fn remove_peer(&self, data: &[u8]) -> Result<(), V2RayError> {
        let identity = Identity::decode(data)?;
        self.ensure_running("remove peer")?;

        let proxy = identity.proxy();
        let key = identity.key();
        let result = self.control.remove_user(proxy.tag(), &key).await;

        // The local entry goes regardless of the engine's answer.
        let removed = self.peers.delete(&key).is_some();
        match &result {
            Ok(()) => info!(%key, %proxy, removed, "removed peer"),
            Err(err) => warn!(%key, %proxy, removed, %err, "engine rejected peer removal"),
        }
        result.map_err(Into::into)
    }

    fn peer_count(&self) -> usize {
        self.peers.len()
    }

    async fn peer_statistics(&self) -> Result<Vec<PeerStatistic>, V2RayError> {
        self.ensure_running("read peer statistics")?;

        let peers = self.peers.iter();
        let mut items = Vec::with_capacity(peers.len());
        for peer in peers {
            let upload = self.control.get_counter(&uplink_counter(peer.key())).await?;
            let download = self
                .control
                .get_counter(&downlink_counter(peer.key()))
                .await?;
            items.push(PeerStatistic::new(peer.key(), upload, download));
        }

        debug!(peers = items.len(), "collected peer statistics");
        Ok(items)
    }

    fn info(&self) -> Vec<u8> {
        self.config.info.to_bytes().to_vec()
    }

    fn service_type(&self) -> ServiceType {
        ServiceType::V2Ray
    }
}

impl<C, P> std::fmt::Debug for V2RayServer<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("V2RayServer")
            .field("config", &self.config)
            .field("state", &*self.state.read())
            .field("peers", &self.peers.len())
            .finish()
    }
}

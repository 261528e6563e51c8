use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use dvpn_peers::PeerRegistry;
use dvpn_service_types::{PeerStatistic, ServerService, ServiceType};
use dvpn_v2ray::proto::{TypedMessage, vmess};
use dvpn_v2ray::{
    CONFIG_FILENAME, ControlError, ControlPlane, EngineProcess, IdentityError, ProcessError,
    ProcessStatus, ServerInfo, ServerState, Transport, V2RayError, V2RayServer, V2RayServerConfig,
    peer_key, uplink_counter,
};
use parking_lot::Mutex;
use tempfile::TempDir;
use tonic::Status;

/// In-memory engine: users per inbound tag and named counters.
#[derive(Default)]
struct MockControl {
    users: Mutex<HashSet<(String, String)>>,
    counters: Mutex<HashMap<String, i64>>,
    fail_with: Mutex<Option<Status>>,
}

impl MockControl {
    fn fail_next(&self, status: Status) {
        *self.fail_with.lock() = Some(status);
    }

    fn take_failure(&self) -> Result<(), ControlError> {
        match self.fail_with.lock().take() {
            Some(status) => Err(ControlError::Status(status)),
            None => Ok(()),
        }
    }

    fn has_user(&self, tag: &str, email: &str) -> bool {
        self.users
            .lock()
            .contains(&(tag.to_owned(), email.to_owned()))
    }
}

#[async_trait]
impl ControlPlane for MockControl {
    async fn add_user(
        &self,
        tag: &str,
        email: &str,
        account: TypedMessage,
    ) -> Result<(), ControlError> {
        self.take_failure()?;
        assert!(account.is::<vmess::Account>());
        self.users.lock().insert((tag.to_owned(), email.to_owned()));
        Ok(())
    }

    async fn remove_user(&self, tag: &str, email: &str) -> Result<(), ControlError> {
        self.take_failure()?;
        self.users.lock().remove(&(tag.to_owned(), email.to_owned()));
        Ok(())
    }

    async fn get_counter(&self, name: &str) -> Result<i64, ControlError> {
        self.take_failure()?;
        Ok(self.counters.lock().get(name).copied().unwrap_or(0))
    }
}

/// How the mock engine process reacts to `stop`.
#[derive(Clone, Copy, Default)]
enum StopOutcome {
    #[default]
    Exit,
    /// The process is gone but reaping it failed.
    KillFails,
    /// The process ignored the signal and keeps running.
    Refuse,
}

#[derive(Default)]
struct MockProcess {
    status: Mutex<Option<ProcessStatus>>,
    stop_outcome: Mutex<StopOutcome>,
}

#[async_trait]
impl EngineProcess for MockProcess {
    fn start(&self) -> Result<(), ProcessError> {
        *self.status.lock() = Some(ProcessStatus::Running);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ProcessError> {
        if self.status() != ProcessStatus::Running {
            return Err(ProcessError::NotStarted);
        }
        // Let concurrent callers interleave.
        tokio::task::yield_now().await;

        let outcome = *self.stop_outcome.lock();
        match outcome {
            StopOutcome::Exit => {
                *self.status.lock() = Some(ProcessStatus::Stopped);
                Ok(())
            }
            StopOutcome::KillFails => {
                *self.status.lock() = Some(ProcessStatus::Stopped);
                Err(ProcessError::Kill(std::io::Error::other("no such process")))
            }
            StopOutcome::Refuse => Err(ProcessError::Kill(std::io::Error::other(
                "operation not permitted",
            ))),
        }
    }

    fn status(&self) -> ProcessStatus {
        self.status.lock().unwrap_or(ProcessStatus::NotStarted)
    }
}

struct Harness {
    _home: TempDir,
    control: Arc<MockControl>,
    server: V2RayServer<Arc<MockControl>, MockProcess>,
}

fn harness() -> Harness {
    let home = TempDir::new().unwrap();
    let config = V2RayServerConfig::new(home.path().join("v2ray"))
        .with_info(ServerInfo::new(443, Transport::WebSocket));
    let control = Arc::new(MockControl::default());
    let server = V2RayServer::with_components(
        config,
        control.clone(),
        MockProcess::default(),
        Arc::new(PeerRegistry::new()),
    );
    Harness {
        _home: home,
        control,
        server,
    }
}

async fn running() -> Harness {
    let h = harness();
    h.server.init().unwrap();
    std::fs::write(h.server.config().config_file(), "{}").unwrap();
    h.server.start().await.unwrap();
    h
}

fn identity(fill: u8) -> Vec<u8> {
    let mut buf = vec![0x01];
    buf.extend_from_slice(&[fill; 16]);
    buf
}

#[tokio::test]
async fn add_peer_registers_after_engine_accepts() {
    let h = running().await;
    let buf = identity(0);

    let response = h.server.add_peer(&buf).await.unwrap();
    assert!(response.is_empty());
    assert_eq!(h.server.peer_count(), 1);
    assert!(h.server.has_peer(&buf).unwrap());
    assert!(h.control.has_user("vmess", &peer_key(&buf).unwrap()));
}

#[tokio::test]
async fn add_peer_rejects_bad_length() {
    let h = running().await;
    let mut buf = vec![0x01];
    buf.extend_from_slice(&[0u8; 9]);

    let err = h.server.add_peer(&buf).await.unwrap_err();
    assert_matches!(
        err,
        V2RayError::Identity(IdentityError::InvalidLength {
            expected: 17,
            got: 10
        })
    );
    assert_eq!(h.server.peer_count(), 0);
}

#[tokio::test]
async fn add_peer_rejects_unsupported_proxy() {
    let h = running().await;
    let mut buf = identity(0);
    buf[0] = 0x00;

    assert_matches!(
        h.server.add_peer(&buf).await,
        Err(V2RayError::Identity(IdentityError::UnsupportedProxy(0)))
    );
    assert_eq!(h.server.peer_count(), 0);
}

#[tokio::test]
async fn add_peer_leaves_registry_untouched_on_engine_error() {
    let h = running().await;
    let buf = identity(1);

    h.control.fail_next(Status::internal("inbound vmess not ready"));
    assert_matches!(
        h.server.add_peer(&buf).await,
        Err(V2RayError::Control(ControlError::Status(_)))
    );
    assert_eq!(h.server.peer_count(), 0);
    assert!(!h.server.has_peer(&buf).unwrap());
}

#[tokio::test]
async fn add_peer_twice_keeps_one_entry() {
    let h = running().await;
    let buf = identity(2);

    h.server.add_peer(&buf).await.unwrap();
    h.server.add_peer(&buf).await.unwrap();
    assert_eq!(h.server.peer_count(), 1);
}

#[tokio::test]
async fn remove_unknown_peer_succeeds() {
    let h = running().await;
    let buf = identity(3);

    assert!(!h.server.has_peer(&buf).unwrap());
    h.server.remove_peer(&buf).await.unwrap();
    assert!(!h.server.has_peer(&buf).unwrap());
}

#[tokio::test]
async fn remove_peer_drops_local_entry_even_on_engine_error() {
    let h = running().await;
    let buf = identity(4);
    h.server.add_peer(&buf).await.unwrap();

    h.control.fail_next(Status::internal("handler busy"));
    let err = h.server.remove_peer(&buf).await.unwrap_err();
    assert_matches!(err, V2RayError::Control(ControlError::Status(_)));

    // Local state converged, remote state did not.
    assert!(!h.server.has_peer(&buf).unwrap());
    assert!(h.control.has_user("vmess", &peer_key(&buf).unwrap()));
}

#[tokio::test]
async fn peer_count_tracks_adds_and_removes() {
    let h = running().await;
    for fill in 0..5 {
        h.server.add_peer(&identity(fill)).await.unwrap();
    }
    h.server.remove_peer(&identity(0)).await.unwrap();
    h.server.remove_peer(&identity(1)).await.unwrap();
    h.server.remove_peer(&identity(42)).await.unwrap();

    assert_eq!(h.server.peer_count(), 3);
}

#[tokio::test]
async fn statistics_default_to_zero() {
    let h = running().await;
    let buf = identity(5);
    h.server.add_peer(&buf).await.unwrap();

    let stats = h.server.peer_statistics().await.unwrap();
    assert_eq!(stats, vec![PeerStatistic::new(peer_key(&buf).unwrap(), 0, 0)]);
}

#[tokio::test]
async fn statistics_read_uplink_and_downlink() {
    let h = running().await;
    let buf = identity(6);
    let key = peer_key(&buf).unwrap();
    h.server.add_peer(&buf).await.unwrap();

    {
        let mut counters = h.control.counters.lock();
        counters.insert(uplink_counter(&key), 1024);
        counters.insert(format!("user>>>{key}>>>traffic>>>downlink"), 4096);
    }

    let stats = h.server.peer_statistics().await.unwrap();
    assert_eq!(stats, vec![PeerStatistic::new(key, 1024, 4096)]);
}

#[tokio::test]
async fn statistics_abort_on_engine_error() {
    let h = running().await;
    h.server.add_peer(&identity(7)).await.unwrap();

    h.control.fail_next(Status::unavailable("engine restarting"));
    let err = h.server.peer_statistics().await.unwrap_err();
    assert_matches!(&err, V2RayError::Control(inner) if inner.is_retryable());
}

#[tokio::test]
async fn peer_operations_require_running() {
    let h = harness();
    let buf = identity(8);

    assert_matches!(
        h.server.add_peer(&buf).await,
        Err(V2RayError::NotRunning {
            state: ServerState::Uninitialized,
            ..
        })
    );
    assert_matches!(
        h.server.remove_peer(&buf).await,
        Err(V2RayError::NotRunning { .. })
    );
    assert_matches!(
        h.server.peer_statistics().await,
        Err(V2RayError::NotRunning { .. })
    );

    // Registry reads stay available.
    assert!(!h.server.has_peer(&buf).unwrap());
    assert_eq!(h.server.peer_count(), 0);
}

#[tokio::test]
async fn lifecycle_transitions() {
    let h = harness();
    assert_eq!(h.server.state(), ServerState::Uninitialized);

    assert_matches!(
        h.server.start().await,
        Err(V2RayError::InvalidState {
            op: "start",
            state: ServerState::Uninitialized
        })
    );
    assert_matches!(
        h.server.stop().await,
        Err(V2RayError::Process(ProcessError::NotStarted))
    );

    h.server.init().unwrap();
    h.server.init().unwrap();
    assert_eq!(h.server.state(), ServerState::Initialized);
    assert!(h.server.config().home_dir().is_dir());

    assert_matches!(h.server.start().await, Err(V2RayError::ConfigMissing(path)) => {
        assert!(path.ends_with(CONFIG_FILENAME));
    });

    std::fs::write(h.server.config().config_file(), "{}").unwrap();
    h.server.start().await.unwrap();
    assert_eq!(h.server.state(), ServerState::Running);
    assert_eq!(h.server.process().status(), ProcessStatus::Running);

    h.server.stop().await.unwrap();
    assert_eq!(h.server.state(), ServerState::Stopped);
    assert_eq!(h.server.process().status(), ProcessStatus::Stopped);
    assert_matches!(
        h.server.stop().await,
        Err(V2RayError::InvalidState { op: "stop", .. })
    );
    assert_matches!(h.server.start().await, Err(V2RayError::InvalidState { .. }));
}

#[tokio::test]
async fn has_peer_validates_length() {
    let h = harness();
    assert_matches!(
        h.server.has_peer(&[0x01; 4]),
        Err(V2RayError::Identity(IdentityError::InvalidLength { got: 4, .. }))
    );
}

#[tokio::test]
async fn static_accessors() {
    let h = harness();
    assert_eq!(h.server.service_type(), ServiceType::V2Ray);
    assert_eq!(h.server.info(), vec![0x01, 0xbb, 0x03]);
}

#[tokio::test]
async fn concurrent_adds_for_distinct_peers() {
    let h = Arc::new(running().await);
    let tasks: Vec<_> = (0..16u8)
        .map(|fill| {
            let h = h.clone();
            tokio::spawn(async move { h.server.add_peer(&identity(fill)).await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert_eq!(h.server.peer_count(), 16);
}

#[tokio::test]
async fn concurrent_stops_stop_once() {
    let h = running().await;

    let (first, second) = tokio::join!(h.server.stop(), h.server.stop());
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .any(|r| matches!(r, Err(V2RayError::InvalidState { op: "stop", .. })))
    );
    assert_eq!(h.server.state(), ServerState::Stopped);
}

#[tokio::test]
async fn stop_follows_engine_when_kill_fails() {
    let h = running().await;
    *h.server.process().stop_outcome.lock() = StopOutcome::KillFails;

    assert_matches!(
        h.server.stop().await,
        Err(V2RayError::Process(ProcessError::Kill(_)))
    );
    assert_eq!(h.server.state(), ServerState::Stopped);
    assert_matches!(
        h.server.stop().await,
        Err(V2RayError::InvalidState { op: "stop", .. })
    );
}

#[tokio::test]
async fn stop_keeps_running_when_engine_survives() {
    let h = running().await;
    *h.server.process().stop_outcome.lock() = StopOutcome::Refuse;

    assert_matches!(
        h.server.stop().await,
        Err(V2RayError::Process(ProcessError::Kill(_)))
    );
    assert_eq!(h.server.state(), ServerState::Running);
    h.server.add_peer(&identity(9)).await.unwrap();

    *h.server.process().stop_outcome.lock() = StopOutcome::Exit;
    h.server.stop().await.unwrap();
    assert_eq!(h.server.state(), ServerState::Stopped);
}

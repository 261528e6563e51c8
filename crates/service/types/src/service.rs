//! Backend capability traits.

use async_trait::async_trait;
use auto_impl::auto_impl;

use crate::{PeerStatistic, ServiceType};

/// Server-side capability of a service backend.
///
/// Session management decides *when* peers are added or removed; the backend
/// only provisions them. Peer operations take the backend's opaque identity
/// buffer, whose layout is defined by each implementation.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait ServerService: Send + Sync {
    /// Error type returned by fallible operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Prepare on-disk state. Safe to call more than once.
    fn init(&self) -> Result<(), Self::Error>;

    /// Start the backend.
    async fn start(&self) -> Result<(), Self::Error>;

    /// Stop the backend.
    async fn stop(&self) -> Result<(), Self::Error>;

    /// Provision a peer, returning implementation-defined response bytes.
    async fn add_peer(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// Whether the peer is currently provisioned.
    fn has_peer(&self, data: &[u8]) -> Result<bool, Self::Error>;

    /// Deprovision a peer. Removing an absent peer succeeds.
    async fn remove_peer(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Number of provisioned peers.
    fn peer_count(&self) -> usize;

    /// Traffic counters for every provisioned peer.
    async fn peer_statistics(&self) -> Result<Vec<PeerStatistic>, Self::Error>;

    /// Static information about the server, advertised to clients.
    fn info(&self) -> Vec<u8>;

    fn service_type(&self) -> ServiceType;
}

/// Client-side capability of a service backend: bring-up and tear-down of an
/// outbound tunnel.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait ClientService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn pre_up(&self) -> Result<(), Self::Error>;

    async fn up(&self) -> Result<(), Self::Error>;

    async fn post_up(&self) -> Result<(), Self::Error>;

    async fn pre_down(&self) -> Result<(), Self::Error>;

    async fn down(&self) -> Result<(), Self::Error>;

    async fn post_down(&self) -> Result<(), Self::Error>;

    fn is_up(&self) -> bool;

    fn info(&self) -> Vec<u8>;

    /// Total `(upload, download)` bytes through the tunnel.
    async fn statistics(&self) -> Result<(i64, i64), Self::Error>;
}

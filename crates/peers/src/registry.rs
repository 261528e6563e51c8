//! Key → peer map guarded by a reader-writer lock.

use std::collections::HashMap;
use std::ops::ControlFlow;

use parking_lot::RwLock;
use tracing::trace;

use crate::Peer;

/// Registry of provisioned peers (all operations RwLock-protected).
///
/// Writes are first-writer-wins: putting a key that is already present leaves
/// the stored peer untouched. Deleting an absent key is a no-op.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<String, Peer>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Peer> {
        self.peers.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.peers.read().contains_key(key)
    }

    /// Insert a peer unless its key is already registered.
    ///
    /// Returns `true` if the peer was inserted.
    pub fn put(&self, peer: Peer) -> bool {
        let mut peers = self.peers.write();
        if peers.contains_key(peer.key()) {
            trace!(key = %peer.key(), "peer already registered");
            return false;
        }
        peers.insert(peer.key().to_owned(), peer);
        true
    }

    /// Remove a peer, returning it if it was present.
    pub fn delete(&self, key: &str) -> Option<Peer> {
        self.peers.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every peer while holding the shared lock.
    ///
    /// `visit` may stop the traversal early with [`ControlFlow::Break`]; the
    /// first error it returns aborts the traversal and is returned. `visit`
    /// must not write to this registry: the write lock would deadlock against
    /// the read lock held here.
    pub fn try_for_each<E, F>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&Peer) -> Result<ControlFlow<()>, E>,
    {
        let peers = self.peers.read();
        for peer in peers.values() {
            if visit(peer)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Snapshot of the registered peers.
    ///
    /// The lock is released before the iterator is returned, so the caller may
    /// await between items or mutate the registry. Call again to restart.
    pub fn iter(&self) -> PeerIter {
        PeerIter {
            inner: self.peers.read().values().cloned().collect::<Vec<_>>().into_iter(),
        }
    }
}

/// Finite iterator over a registry snapshot.
#[derive(Debug)]
pub struct PeerIter {
    inner: std::vec::IntoIter<Peer>,
}

impl Iterator for PeerIter {
    type Item = Peer;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for PeerIter {}

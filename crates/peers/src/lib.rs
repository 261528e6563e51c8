//! In-memory registry of the peers a backend has provisioned.
//!
//! The registry is an owned value; backends hold it behind an `Arc` and share
//! it with whoever needs read access. It is never persisted.

mod peer;
mod registry;

pub use peer::Peer;
pub use registry::{PeerIter, PeerRegistry};

use serde::{Deserialize, Serialize};

/// A provisioned identity, known by its opaque key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    key: String,
}

impl Peer {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Unique key of the peer within a registry.
    pub fn key(&self) -> &str {
        &self.key
    }
}

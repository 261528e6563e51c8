use serde::{Deserialize, Serialize};

/// Traffic counters for a single peer, in bytes.
///
/// A point-in-time snapshot; servers recompute it on every query.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerStatistic {
    /// Bytes sent to the peer.
    pub download: i64,
    /// Registry key of the peer.
    pub key: String,
    /// Bytes sent by the peer.
    pub upload: i64,
}

impl PeerStatistic {
    pub fn new(key: impl Into<String>, upload: i64, download: i64) -> Self {
        Self {
            download,
            key: key.into(),
            upload,
        }
    }
}

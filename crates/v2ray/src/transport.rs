//! Outer transports the engine can carry a proxy over.

use core::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Engine transport protocol.
///
/// Consumed by engine configuration and advertised in [`ServerInfo`](crate::ServerInfo).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)] // Into<&'static str>
#[derive(strum::EnumString)] // FromStr
#[derive(strum::EnumIter)] // Transport::iter
#[derive(TryFromPrimitive)] // TryFrom<u8>
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Transport {
    #[default]
    Unspecified = 0x00,
    Tcp = 0x01,
    Mkcp = 0x02,
    WebSocket = 0x03,
    Http = 0x04,
    DomainSocket = 0x05,
    Quic = 0x06,
    Gun = 0x07,
    Grpc = 0x08,
}

impl Transport {
    /// Returns the canonical name of the transport.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parses a canonical name, mapping anything unknown to `Unspecified`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl From<Transport> for u8 {
    #[inline]
    fn from(value: Transport) -> Self {
        value as u8
    }
}

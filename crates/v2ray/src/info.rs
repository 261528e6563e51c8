//! Server information advertised to clients.

use crate::Transport;

/// Length of the encoded server information.
pub const INFO_LEN: usize = 2 + 1;

/// Where clients reach the engine's proxy inbound.
///
/// Encoded as the big-endian inbound port followed by the transport byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub port: u16,
    pub transport: Transport,
}

impl ServerInfo {
    pub fn new(port: u16, transport: Transport) -> Self {
        Self { port, transport }
    }

    pub fn to_bytes(&self) -> [u8; INFO_LEN] {
        let [hi, lo] = self.port.to_be_bytes();
        [hi, lo, self.transport.into()]
    }

    /// Decode server information; `None` on a malformed buffer.
    pub fn from_bytes(buf: &[u8]) -> Option<Self> {
        let [hi, lo, transport]: [u8; INFO_LEN] = buf.try_into().ok()?;
        Some(Self {
            port: u16::from_be_bytes([hi, lo]),
            transport: Transport::try_from(transport).ok()?,
        })
    }
}

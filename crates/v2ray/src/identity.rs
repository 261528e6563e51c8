//! Identity buffers and the registry keys derived from them.
//!
//! Layout (17 bytes):
//!
//! | Offset | Length | Meaning                   |
//! |--------|--------|---------------------------|
//! | 0      | 1      | [`Proxy`] selector        |
//! | 1      | 16     | credential (UUID)         |
//!
//! The registry key is the standard base64 encoding of the whole buffer, so a
//! key can always be decoded back into the identity it names.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::Proxy;

/// Length of an identity buffer.
pub const IDENTITY_LEN: usize = 1 + 16;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid data length; expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    #[error("unsupported proxy selector {0:#04x}")]
    UnsupportedProxy(u8),

    #[error("invalid peer key: {0}")]
    InvalidKey(#[from] base64::DecodeError),
}

fn check_len(buf: &[u8]) -> Result<&[u8; IDENTITY_LEN], IdentityError> {
    buf.try_into().map_err(|_| IdentityError::InvalidLength {
        expected: IDENTITY_LEN,
        got: buf.len(),
    })
}

/// Registry key for an identity buffer. Only the length is validated.
pub fn peer_key(buf: &[u8]) -> Result<String, IdentityError> {
    check_len(buf).map(|bytes| STANDARD.encode(bytes))
}

/// Decode a registry key back into the raw identity buffer.
pub fn decode_key(key: &str) -> Result<[u8; IDENTITY_LEN], IdentityError> {
    let bytes = STANDARD.decode(key)?;
    check_len(&bytes).copied()
}

/// A validated identity: a supported proxy and a credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identity {
    proxy: Proxy,
    id: Uuid,
}

impl Identity {
    /// Create an identity. Fails if the proxy cannot be provisioned.
    pub fn new(proxy: Proxy, id: Uuid) -> Result<Self, IdentityError> {
        if !proxy.is_supported() {
            return Err(IdentityError::UnsupportedProxy(proxy.into()));
        }
        Ok(Self { proxy, id })
    }

    /// Decode and validate an identity buffer.
    pub fn decode(buf: &[u8]) -> Result<Self, IdentityError> {
        let [selector, credential @ ..] = check_len(buf)?;
        let proxy =
            Proxy::try_from(*selector).map_err(|_| IdentityError::UnsupportedProxy(*selector))?;
        Self::new(proxy, Uuid::from_bytes(*credential))
    }

    /// Decode an identity from its registry key.
    pub fn from_key(key: &str) -> Result<Self, IdentityError> {
        Self::decode(&decode_key(key)?)
    }

    pub fn proxy(&self) -> Proxy {
        self.proxy
    }

    pub fn id(&self) -> &Uuid {
        &self.id
    }

    pub fn to_bytes(&self) -> [u8; IDENTITY_LEN] {
        let mut buf = [0u8; IDENTITY_LEN];
        let (selector, credential) = buf.split_at_mut(1);
        selector.copy_from_slice(&[self.proxy.into()]);
        credential.copy_from_slice(self.id.as_bytes());
        buf
    }

    /// Registry key, also used as the user email on the engine.
    pub fn key(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }
}

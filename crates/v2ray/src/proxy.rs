//! Inbound proxy protocols the engine serves.

use core::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::proto::{
    TypedMessage,
    protocol::{SecurityConfig, SecurityType},
    vmess,
};

/// Proxy protocol selected by the first byte of an identity buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)] // Into<&'static str>
#[derive(strum::EnumString)] // FromStr
#[derive(strum::EnumIter)] // Proxy::iter
#[derive(TryFromPrimitive)] // TryFrom<u8>
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Proxy {
    #[default]
    Unspecified = 0x00,
    VMess = 0x01,
}

/// How a supported proxy is addressed on the control plane.
struct ProxyDescriptor {
    /// Tag of the engine inbound serving this protocol.
    tag: &'static str,
    /// Builds the packed account for a user credential.
    account: fn(&Uuid) -> TypedMessage,
}

static VMESS: ProxyDescriptor = ProxyDescriptor {
    tag: "vmess",
    account: vmess_account,
};

fn vmess_account(id: &Uuid) -> TypedMessage {
    TypedMessage::pack(&vmess::Account {
        id: id.hyphenated().to_string(),
        alter_id: 0,
        security_settings: Some(SecurityConfig {
            r#type: SecurityType::Auto as i32,
        }),
        tests_enabled: String::new(),
    })
}

impl Proxy {
    fn descriptor(self) -> Option<&'static ProxyDescriptor> {
        match self {
            Proxy::Unspecified => None,
            Proxy::VMess => Some(&VMESS),
        }
    }

    /// Returns the canonical name of the proxy.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parses a canonical name, mapping anything unknown to `Unspecified`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// Whether the control plane can provision users for this proxy.
    pub fn is_supported(self) -> bool {
        self.descriptor().is_some()
    }

    /// Inbound tag on the engine; empty for unsupported proxies.
    pub fn tag(self) -> &'static str {
        self.descriptor().map_or("", |d| d.tag)
    }

    /// Packed engine account for `id`, if the proxy is supported.
    pub fn account(self, id: &Uuid) -> Option<TypedMessage> {
        self.descriptor().map(|d| (d.account)(id))
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl From<Proxy> for u8 {
    #[inline]
    fn from(value: Proxy) -> Self {
        value as u8
    }
}

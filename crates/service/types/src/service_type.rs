use core::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};

/// Kind of network service backing a node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::IntoStaticStr)] // Into<&'static str>
#[derive(strum::EnumString)] // FromStr
#[derive(strum::EnumIter)] // ServiceType::iter
#[derive(TryFromPrimitive)] // TryFrom<u8>
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ServiceType {
    #[default]
    Unspecified = 0x00,
    WireGuard = 0x01,
    V2Ray = 0x02,
}

impl ServiceType {
    /// Returns the canonical name of the service type.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Parses a canonical name, mapping anything unknown to `Unspecified`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_str().fmt(f)
    }
}

impl From<ServiceType> for u8 {
    #[inline]
    fn from(value: ServiceType) -> Self {
        value as u8
    }
}

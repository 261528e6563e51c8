//! Wire messages of the V2Ray management API.
//!
//! Only the messages the control plane needs are declared. Field numbers and
//! package names follow the engine's protobuf definitions, so these encode
//! identically to the engine's own generated types.

use prost::Name;

/// Type URL prefix the engine uses for packed messages.
pub const TYPE_URL_PREFIX: &str = "types.v2fly.org/";

/// A packed protobuf message, wire-compatible with `google.protobuf.Any`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct TypedMessage {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

impl TypedMessage {
    /// Pack a message under the engine's type URL scheme.
    pub fn pack<M: Name>(message: &M) -> Self {
        Self {
            type_url: format!("{TYPE_URL_PREFIX}{}", M::full_name()),
            value: message.encode_to_vec(),
        }
    }

    /// Whether this wraps a message of type `M`.
    pub fn is<M: Name>(&self) -> bool {
        self.type_url
            .strip_prefix(TYPE_URL_PREFIX)
            .is_some_and(|name| name == M::full_name())
    }

    /// Decode the wrapped message as `M`.
    pub fn unpack<M: Name + Default>(&self) -> Result<M, prost::DecodeError> {
        M::decode(self.value.as_slice())
    }
}

macro_rules! impl_name {
    ($($ty:ty => $package:literal, $name:literal;)+) => {$(
        impl Name for $ty {
            const NAME: &'static str = $name;
            const PACKAGE: &'static str = $package;
        }
    )+};
}

pub mod protocol {
    use super::TypedMessage;

    /// A user of an inbound handler.
    #[derive(Clone, PartialEq, prost::Message)]
    pub struct User {
        #[prost(uint32, tag = "1")]
        pub level: u32,
        #[prost(string, tag = "2")]
        pub email: String,
        /// Protocol-specific account, packed.
        #[prost(message, optional, tag = "3")]
        pub account: Option<TypedMessage>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
    #[repr(i32)]
    pub enum SecurityType {
        Unknown = 0,
        Legacy = 1,
        Auto = 2,
        Aes128Gcm = 3,
        Chacha20Poly1305 = 4,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct SecurityConfig {
        #[prost(enumeration = "SecurityType", tag = "1")]
        pub r#type: i32,
    }
}

pub mod vmess {
    use super::protocol::SecurityConfig;

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Account {
        /// User UUID in hyphenated form.
        #[prost(string, tag = "1")]
        pub id: String,
        #[prost(uint32, tag = "2")]
        pub alter_id: u32,
        #[prost(message, optional, tag = "3")]
        pub security_settings: Option<SecurityConfig>,
        #[prost(string, tag = "4")]
        pub tests_enabled: String,
    }
}

pub mod proxyman {
    use super::TypedMessage;
    use super::protocol::User;

    pub const ALTER_INBOUND_PATH: &str =
        "/v2ray.core.app.proxyman.command.HandlerService/AlterInbound";

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct AddUserOperation {
        #[prost(message, optional, tag = "1")]
        pub user: Option<User>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct RemoveUserOperation {
        #[prost(string, tag = "1")]
        pub email: String,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct AlterInboundRequest {
        /// Tag of the inbound handler to alter.
        #[prost(string, tag = "1")]
        pub tag: String,
        /// Packed `AddUserOperation` or `RemoveUserOperation`.
        #[prost(message, optional, tag = "2")]
        pub operation: Option<TypedMessage>,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct AlterInboundResponse {}
}

pub mod stats {
    pub const GET_STATS_PATH: &str = "/v2ray.core.app.stats.command.StatsService/GetStats";

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetStatsRequest {
        /// Fully qualified counter name.
        #[prost(string, tag = "1")]
        pub name: String,
        /// Reset the counter after reading.
        #[prost(bool, tag = "2")]
        pub reset: bool,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct Stat {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(int64, tag = "2")]
        pub value: i64,
    }

    #[derive(Clone, PartialEq, prost::Message)]
    pub struct GetStatsResponse {
        #[prost(message, optional, tag = "1")]
        pub stat: Option<Stat>,
    }
}

impl_name! {
    protocol::User => "v2ray.core.common.protocol", "User";
    vmess::Account => "v2ray.core.proxy.vmess", "Account";
    proxyman::AddUserOperation => "v2ray.core.app.proxyman.command", "AddUserOperation";
    proxyman::RemoveUserOperation => "v2ray.core.app.proxyman.command", "RemoveUserOperation";
}

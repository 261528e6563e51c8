//! CLI argument structs for node configuration.
//!
//! These args serve dual purposes:
//! - CLI parsing via clap (`#[derive(Args)]`)
//! - Configuration serialization via serde (`#[derive(Serialize, Deserialize)]`)

mod datadir;
mod log;
mod v2ray;

pub use datadir::DataDirArgs;
pub use log::LogArgs;
pub use v2ray::V2RayArgs;

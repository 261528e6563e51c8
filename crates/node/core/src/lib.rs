//! Node infrastructure shared by the dvpn commands.
//!
//! - [`args`] - CLI argument structs that double as configuration sections
//! - [`dirs`] - Data directory layout
//! - [`logging`] - Logging initialization
//! - [`version`] - Version information

pub mod args;
pub mod dirs;
pub mod logging;
pub mod version;

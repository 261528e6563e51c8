//! Capability types shared by dvpn service backends.
//!
//! - [`ServiceType`] - which backend implementation a service is
//! - [`PeerStatistic`] - per-peer traffic counters reported by a server
//! - [`ServerService`] / [`ClientService`] - the capability surfaces consumed
//!   by session management

mod service;
mod service_type;
mod statistic;

pub use service::{ClientService, ServerService};
pub use service_type::ServiceType;
pub use statistic::PeerStatistic;

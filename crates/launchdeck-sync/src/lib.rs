//! Upstream synchronisation for launchdeck.
//!
//! Pulls launches, rockets and launchpads from the upstream API, normalises
//! them, and reconciles them into a [`launchdeck_core::store::RecordStore`]
//! by natural key. Upstream responses are held in a time-bounded cache so
//! repeated reads within the TTL cost nothing.
//!
//! The public surface is [`SyncService`].

pub mod cache;
pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod mapper;
pub mod names;
pub mod service;
pub mod transport;
pub mod upstream;

#[cfg(test)]
mod fake;

pub use config::{SyncConfig, UpstreamConfig};
pub use error::{Error, Result};
pub use service::SyncService;
pub use upstream::UpstreamClient;

//! Upstream and sync settings.
//!
//! Deserialised by the server binary from its layered `config` sources; every
//! field has a default so an empty section is valid.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE_URL: &str = "https://api.spacexdata.com";

/// The health check never waits longer than this, whatever `timeout` says.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
  pub api_base_url: String,
  /// Request timeout, seconds.
  pub timeout:      u64,
  /// Response cache TTL, seconds.
  pub cache_time:   u64,
  pub sync:         SyncConfig,
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      api_base_url: DEFAULT_API_BASE_URL.to_owned(),
      timeout:      30,
      cache_time:   3600,
      sync:         SyncConfig::default(),
    }
  }
}

impl UpstreamConfig {
  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout) }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_time) }

  pub fn health_check_timeout(&self) -> Duration {
    self.timeout().min(HEALTH_CHECK_TIMEOUT)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
  /// Advisory. Items are not batched; a progress line is logged every
  /// `batch_size` items.
  pub batch_size:             usize,
  /// Seconds to wait between per-item upstream lookups within a run.
  pub delay_between_requests: u64,
}

impl Default for SyncConfig {
  fn default() -> Self { Self { batch_size: 100, delay_between_requests: 1 } }
}

impl SyncConfig {
  pub fn delay(&self) -> Duration { Duration::from_secs(self.delay_between_requests) }

  /// No throttling, and progress logged only at the end. Useful in tests.
  pub fn unthrottled() -> Self { Self { batch_size: 0, delay_between_requests: 0 } }
}

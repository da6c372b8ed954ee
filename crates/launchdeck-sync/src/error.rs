//! Error type for `launchdeck-sync`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The upstream could not be reached: DNS, connect, TLS, or timeout.
  #[error("upstream unavailable: {0}")]
  UpstreamUnavailable(String),

  /// The upstream answered with a non-2xx status.
  #[error("upstream returned {status}: {body}")]
  UpstreamError { status: u16, body: String },

  /// The upstream answered 2xx but the body is not the JSON we expect.
  #[error("malformed upstream response: {0}")]
  UpstreamMalformed(String),

  /// Writing a synced record failed. Aborts the run; records already
  /// upserted stay committed.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// HTTP status reported by upstream, if this is an [`Error::UpstreamError`].
  pub fn upstream_status(&self) -> Option<u16> {
    match self {
      Self::UpstreamError { status, .. } => Some(*status),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

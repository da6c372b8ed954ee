//! Error types for `launchdeck-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown entity kind: {0:?}")]
  UnknownEntityKind(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

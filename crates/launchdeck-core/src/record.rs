//! Envelopes the store wraps around records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record as persisted: the synced payload plus the store's surrogate ID
/// and bookkeeping timestamps.
///
/// The surrogate `id` is local only; reconciliation always goes through the
/// record's `external_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<R> {
  pub id:         i64,
  #[serde(flatten)]
  pub record:     R,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// The result of a create-or-update keyed by natural key.
#[derive(Debug, Clone, PartialEq)]
pub struct Upserted<R> {
  pub stored:      Stored<R>,
  /// `true` if the natural key was not present before this upsert.
  pub was_created: bool,
}

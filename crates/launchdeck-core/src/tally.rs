//! Per-run sync results.

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;

/// What happened to one upstream item during a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
  Created,
  Updated,
  /// The item could not be turned into a record and was left out of the run.
  Skipped { reason: String },
}

/// Counts for one sync run. Returned to the caller and then discarded; it is
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncTally {
  pub kind:                EntityKind,
  pub total_from_upstream: usize,
  pub created:             usize,
  pub updated:             usize,
  pub skipped:             usize,
}

impl SyncTally {
  pub fn new(kind: EntityKind, total_from_upstream: usize) -> Self {
    Self { kind, total_from_upstream, created: 0, updated: 0, skipped: 0 }
  }

  pub fn record(&mut self, outcome: &ItemOutcome) {
    match outcome {
      ItemOutcome::Created => self.created += 1,
      ItemOutcome::Updated => self.updated += 1,
      ItemOutcome::Skipped { .. } => self.skipped += 1,
    }
  }
}

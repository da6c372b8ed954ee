//! The `RecordStore` trait — the local persistence contract.
//!
//! The trait is implemented by storage backends (e.g.
//! `launchdeck-store-sqlite`). The sync pipeline writes through it; the API
//! only reads through it.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  launch::LaunchRecord,
  launchpad::LaunchpadRecord,
  query::{LaunchGrouping, LaunchQuery, LaunchStats, NameCount, Page, YearStats},
  record::{Stored, Upserted},
  rocket::RocketRecord,
};

/// Abstraction over a launchdeck store backend.
///
/// Every record kind is keyed by its `external_id`. The store enforces
/// uniqueness of that key; `upsert_*` is atomic per record and never touches
/// any other record.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Natural-key access ────────────────────────────────────────────────

  fn find_launch<'a>(
    &'a self,
    external_id: &'a str,
  ) -> impl Future<Output = Result<Option<Stored<LaunchRecord>>, Self::Error>> + Send + 'a;

  fn find_rocket<'a>(
    &'a self,
    external_id: &'a str,
  ) -> impl Future<Output = Result<Option<Stored<RocketRecord>>, Self::Error>> + Send + 'a;

  fn find_launchpad<'a>(
    &'a self,
    external_id: &'a str,
  ) -> impl Future<Output = Result<Option<Stored<LaunchpadRecord>>, Self::Error>> + Send + 'a;

  // ── Upserts ───────────────────────────────────────────────────────────

  /// Create the launch if its natural key is absent, else overwrite every
  /// synced field. `created_at` is preserved on update.
  fn upsert_launch(
    &self,
    record: LaunchRecord,
  ) -> impl Future<Output = Result<Upserted<LaunchRecord>, Self::Error>> + Send + '_;

  fn upsert_rocket(
    &self,
    record: RocketRecord,
  ) -> impl Future<Output = Result<Upserted<RocketRecord>, Self::Error>> + Send + '_;

  fn upsert_launchpad(
    &self,
    record: LaunchpadRecord,
  ) -> impl Future<Output = Result<Upserted<LaunchpadRecord>, Self::Error>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  fn list_launches<'a>(
    &'a self,
    query: &'a LaunchQuery,
  ) -> impl Future<Output = Result<Page<Stored<LaunchRecord>>, Self::Error>> + Send + 'a;

  /// All rockets ordered by name; `active_only` keeps `active = true`.
  fn list_rockets(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Stored<RocketRecord>>, Self::Error>> + Send + '_;

  /// All launchpads ordered by name; `active_only` keeps status `"active"`.
  fn list_launchpads(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Stored<LaunchpadRecord>>, Self::Error>> + Send + '_;

  /// Completed launches, most recent first.
  fn recent_launches(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Stored<LaunchRecord>>, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  /// The earliest launch flagged upcoming and dated after `now`; failing
  /// that, the earliest launch of any flag dated after `now`.
  fn next_launch(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<Stored<LaunchRecord>>, Self::Error>> + Send + '_;

  fn launch_stats(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<LaunchStats, Self::Error>> + Send + '_;

  /// Completed launches grouped by year of `date_utc`, ascending.
  fn launches_by_year(
    &self,
  ) -> impl Future<Output = Result<Vec<YearStats>, Self::Error>> + Send + '_;

  /// Distinct years having a dated launch, descending.
  fn available_years(
    &self,
  ) -> impl Future<Output = Result<Vec<i32>, Self::Error>> + Send + '_;

  /// Launch counts per resolved rocket or launchpad name, largest first.
  /// Launches whose name was never resolved are not counted.
  fn launch_counts_by(
    &self,
    grouping: LaunchGrouping,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<NameCount>, Self::Error>> + Send + '_;
}

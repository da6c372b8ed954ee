//! Read-side query parameters and aggregate shapes.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

// ─── Launch listing ──────────────────────────────────────────────────────────

/// Column a launch listing is ordered by.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LaunchSort {
  #[default]
  DateUtc,
  Name,
  FlightNumber,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

/// Parameters for [`crate::store::RecordStore::list_launches`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchQuery {
  /// Calendar year of `date_utc`.
  pub year:         Option<i32>,
  pub success:      Option<bool>,
  /// `Some(true)` keeps upcoming launches, `Some(false)` completed ones.
  pub upcoming:     Option<bool>,
  pub rocket_id:    Option<String>,
  pub launchpad_id: Option<String>,
  /// Matched against name, details and flight number.
  pub search:       Option<String>,
  pub page:         u32,
  pub per_page:     u32,
  pub sort_by:      LaunchSort,
  pub direction:    SortDirection,
}

impl Default for LaunchQuery {
  fn default() -> Self {
    Self {
      year:         None,
      success:      None,
      upcoming:     None,
      rocket_id:    None,
      launchpad_id: None,
      search:       None,
      page:         1,
      per_page:     Self::DEFAULT_PER_PAGE,
      sort_by:      LaunchSort::default(),
      direction:    SortDirection::default(),
    }
  }
}

impl LaunchQuery {
  pub const DEFAULT_PER_PAGE: u32 = 20;
  pub const MAX_PER_PAGE: u32 = 100;

  /// Clamp paging into range. Blank search strings count as no search.
  pub fn normalized(mut self) -> Self {
    self.page = self.page.max(1);
    self.per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
    self.search = self.search.filter(|s| !s.trim().is_empty());
    self
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
  }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:     Vec<T>,
  pub total:     u64,
  pub page:      u32,
  pub per_page:  u32,
  pub last_page: u32,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, total: u64, page: u32, per_page: u32) -> Self {
    let per_page = per_page.max(1);
    let last_page = total.div_ceil(u64::from(per_page)).max(1);
    Self {
      items,
      total,
      page,
      per_page,
      last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
    }
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Grouping key for launch counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchGrouping {
  Rocket,
  Launchpad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchStats {
  /// Launches not flagged upcoming.
  pub total_launches:      u64,
  pub successful_launches: u64,
  pub failed_launches:     u64,
  /// Launches dated in the future, regardless of flag.
  pub upcoming_launches:   u64,
  pub success_rate:        f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearStats {
  pub year:         i32,
  pub total:        u64,
  pub successful:   u64,
  pub failed:       u64,
  pub success_rate: f64,
}

impl YearStats {
  pub fn new(year: i32, total: u64, successful: u64) -> Self {
    Self {
      year,
      total,
      successful,
      failed: total.saturating_sub(successful),
      success_rate: success_rate(successful, total),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
  pub name:  String,
  pub count: u64,
}

/// `part / total` as a percentage rounded to two places; zero when `total`
/// is zero.
pub fn success_rate(part: u64, total: u64) -> f64 {
  if total == 0 {
    return 0.0;
  }
  (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

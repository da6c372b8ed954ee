//! Launch records — the main entity shown on the dashboard.
//!
//! Rocket and launchpad names are denormalised into each launch at sync time
//! so that read endpoints never have to join or call upstream.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── References ──────────────────────────────────────────────────────────────

/// A soft reference to another entity by external ID, with the display name
/// resolved when the referencing record was synced.
///
/// The ID is kept even when the name could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
  pub id:   Option<String>,
  pub name: Option<String>,
}

impl EntityRef {
  pub fn unresolved(id: Option<String>) -> Self { Self { id, name: None } }
}

// ─── Outcome and status ──────────────────────────────────────────────────────

/// What upstream reports about how a launch went. Independent of whether the
/// launch is flagged as upcoming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
  Success,
  Failure,
  Unknown,
}

impl From<Option<bool>> for Outcome {
  fn from(success: Option<bool>) -> Self {
    match success {
      Some(true) => Self::Success,
      Some(false) => Self::Failure,
      None => Self::Unknown,
    }
  }
}

/// The status shown to dashboard consumers. An upcoming launch is always
/// `Upcoming`, whatever outcome upstream may transiently report for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStatus {
  Upcoming,
  Success,
  Failure,
  Unknown,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A launch as normalised from upstream. `external_id` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
  pub external_id:   String,
  pub flight_number: Option<i64>,
  pub name:          String,
  pub date_utc:      Option<DateTime<Utc>>,
  /// Local wall-clock time at the launch site, offset preserved.
  pub date_local:    Option<DateTime<FixedOffset>>,
  pub success:       Option<bool>,
  pub failures:      Vec<Value>,
  pub upcoming:      bool,
  pub details:       Option<String>,
  pub rocket:        EntityRef,
  pub launchpad:     EntityRef,
  /// Named URLs (`webcast`, `article`, `wikipedia`, `patch`, ...), passed
  /// through as upstream shapes them.
  pub links:         Map<String, Value>,
  pub payloads:      Vec<Value>,
  pub crew:          Vec<Value>,
  pub cores:         Vec<Value>,
}

impl LaunchRecord {
  /// A record with every optional field empty.
  pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      external_id:   external_id.into(),
      flight_number: None,
      name:          name.into(),
      date_utc:      None,
      date_local:    None,
      success:       None,
      failures:      Vec::new(),
      upcoming:      false,
      details:       None,
      rocket:        EntityRef::default(),
      launchpad:     EntityRef::default(),
      links:         Map::new(),
      payloads:      Vec::new(),
      crew:          Vec::new(),
      cores:         Vec::new(),
    }
  }

  pub fn outcome(&self) -> Outcome { Outcome::from(self.success) }

  pub fn status(&self) -> LaunchStatus {
    if self.upcoming {
      return LaunchStatus::Upcoming;
    }
    match self.outcome() {
      Outcome::Success => LaunchStatus::Success,
      Outcome::Failure => LaunchStatus::Failure,
      Outcome::Unknown => LaunchStatus::Unknown,
    }
  }

  /// Whole days from `now` until launch, negative if the date has passed.
  /// Only defined for upcoming launches with a known UTC date.
  pub fn days_until_launch(&self, now: DateTime<Utc>) -> Option<i64> {
    if !self.upcoming {
      return None;
    }
    self.date_utc.map(|at| (at - now).num_days())
  }

  pub fn webcast(&self) -> Option<&str> { self.link("webcast") }

  pub fn article(&self) -> Option<&str> { self.link("article") }

  pub fn wikipedia(&self) -> Option<&str> { self.link("wikipedia") }

  fn link(&self, key: &str) -> Option<&str> {
    self.links.get(key).and_then(Value::as_str)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  #[test]
  fn upcoming_without_outcome_is_upcoming() {
    let mut launch = LaunchRecord::new("a", "Crew-9");
    launch.upcoming = true;
    assert_eq!(launch.status(), LaunchStatus::Upcoming);
    assert_eq!(launch.outcome(), Outcome::Unknown);
  }

  #[test]
  fn upcoming_wins_over_transient_outcome() {
    let mut launch = LaunchRecord::new("a", "Crew-9");
    launch.upcoming = true;
    launch.success = Some(false);
    assert_eq!(launch.status(), LaunchStatus::Upcoming);
    assert_eq!(launch.outcome(), Outcome::Failure);
  }

  #[test]
  fn completed_status_follows_outcome() {
    let mut launch = LaunchRecord::new("a", "FalconSat");
    assert_eq!(launch.status(), LaunchStatus::Unknown);
    launch.success = Some(false);
    assert_eq!(launch.status(), LaunchStatus::Failure);
    launch.success = Some(true);
    assert_eq!(launch.status(), LaunchStatus::Success);
  }

  #[test]
  fn days_until_launch_only_for_upcoming() {
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut launch = LaunchRecord::new("a", "Starlink");
    launch.date_utc = Some(Utc.with_ymd_and_hms(2024, 1, 11, 12, 0, 0).unwrap());
    assert_eq!(launch.days_until_launch(now), None);

    launch.upcoming = true;
    assert_eq!(launch.days_until_launch(now), Some(10));

    launch.date_utc = Some(Utc.with_ymd_and_hms(2023, 12, 29, 0, 0, 0).unwrap());
    assert_eq!(launch.days_until_launch(now), Some(-3));
  }

  #[test]
  fn link_accessors_ignore_non_strings() {
    let mut launch = LaunchRecord::new("a", "Demo-2");
    launch.links.insert("webcast".into(), json!("https://youtu.be/x"));
    launch.links.insert("article".into(), json!(null));
    assert_eq!(launch.webcast(), Some("https://youtu.be/x"));
    assert_eq!(launch.article(), None);
    assert_eq!(launch.wikipedia(), None);
  }
}

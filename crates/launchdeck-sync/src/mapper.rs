//! Normalisation of raw upstream JSON into records.
//!
//! Only `id` and `name` are required. Every other field falls back to its
//! default when absent, `null`, or of the wrong type; an unparseable date is
//! treated as absent. Launch references carry the upstream IDs with names
//! left unresolved.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use launchdeck_core::{
  launch::{EntityRef, LaunchRecord},
  launchpad::LaunchpadRecord,
  rocket::RocketRecord,
};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRecord {
  #[error("expected a JSON object")]
  NotAnObject,

  #[error("missing or invalid required field `{0}`")]
  MissingField(&'static str),
}

pub fn map_launch(raw: &Value) -> Result<LaunchRecord, MalformedRecord> {
  let f = Fields::of(raw)?;
  let mut record = LaunchRecord::new(f.required("id")?, f.required("name")?);

  record.flight_number = f.i64("flight_number");
  record.date_utc = f.utc("date_utc");
  record.date_local = f.local("date_local");
  record.success = f.bool("success");
  record.failures = f.array("failures");
  record.upcoming = f.bool("upcoming").unwrap_or(false);
  record.details = f.string("details");
  record.rocket = EntityRef::unresolved(f.reference("rocket"));
  record.launchpad = EntityRef::unresolved(f.reference("launchpad"));
  record.links = f.object("links");
  record.payloads = f.array("payloads");
  record.crew = f.array("crew");
  record.cores = f.array("cores");
  Ok(record)
}

pub fn map_rocket(raw: &Value) -> Result<RocketRecord, MalformedRecord> {
  let f = Fields::of(raw)?;
  let mut record = RocketRecord::new(f.required("id")?, f.required("name")?);

  record.kind = f.string("type");
  record.active = f.bool("active").unwrap_or(true);
  record.stages = f.i64("stages");
  record.boosters = f.i64("boosters");
  record.cost_per_launch = f.f64("cost_per_launch");
  record.success_rate_pct = f.f64("success_rate_pct");
  record.first_flight = f.date("first_flight");
  record.country = f.string("country");
  record.company = f.string("company");
  record.wikipedia = f.string("wikipedia");
  record.description = f.string("description");
  record.flickr_images = f.strings("flickr_images");
  Ok(record)
}

pub fn map_launchpad(raw: &Value) -> Result<LaunchpadRecord, MalformedRecord> {
  let f = Fields::of(raw)?;
  let mut record = LaunchpadRecord::new(f.required("id")?, f.required("name")?);

  record.full_name = f.string("full_name");
  record.locality = f.string("locality");
  record.region = f.string("region");
  record.latitude = f.f64("latitude");
  record.longitude = f.f64("longitude");
  record.launch_attempts = f.i64("launch_attempts").unwrap_or(0);
  record.launch_successes = f.i64("launch_successes").unwrap_or(0);
  record.status = f.string("status");
  record.details = f.string("details");
  // Upstream nests image URLs by size; only the large set is kept.
  record.images = raw
    .pointer("/images/large")
    .and_then(Value::as_array)
    .map(|a| strings_of(a))
    .unwrap_or_default();
  Ok(record)
}

/// The upstream `id` of a raw item, if it has a usable one. For log context
/// when mapping fails.
pub fn raw_id(raw: &Value) -> Option<&str> { raw.get("id").and_then(Value::as_str) }

// ─── Field access ────────────────────────────────────────────────────────────

struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
  fn of(raw: &'a Value) -> Result<Self, MalformedRecord> {
    raw.as_object().map(Fields).ok_or(MalformedRecord::NotAnObject)
  }

  fn get(&self, key: &str) -> Option<&'a Value> {
    self.0.get(key).filter(|v| !v.is_null())
  }

  fn required(&self, key: &'static str) -> Result<String, MalformedRecord> {
    self.non_blank(key).ok_or(MalformedRecord::MissingField(key))
  }

  /// An ID pointing at another record. Blank counts as absent.
  fn reference(&self, key: &str) -> Option<String> { self.non_blank(key) }

  fn non_blank(&self, key: &str) -> Option<String> {
    self.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty()).map(str::to_owned)
  }

  fn string(&self, key: &str) -> Option<String> {
    self.get(key).and_then(Value::as_str).map(str::to_owned)
  }

  fn bool(&self, key: &str) -> Option<bool> { self.get(key).and_then(Value::as_bool) }

  fn i64(&self, key: &str) -> Option<i64> { self.get(key).and_then(Value::as_i64) }

  fn f64(&self, key: &str) -> Option<f64> { self.get(key).and_then(Value::as_f64) }

  fn array(&self, key: &str) -> Vec<Value> {
    self.get(key).and_then(Value::as_array).cloned().unwrap_or_default()
  }

  fn object(&self, key: &str) -> Map<String, Value> {
    self.get(key).and_then(Value::as_object).cloned().unwrap_or_default()
  }

  fn strings(&self, key: &str) -> Vec<String> {
    self.get(key).and_then(Value::as_array).map(|a| strings_of(a)).unwrap_or_default()
  }

  fn utc(&self, key: &str) -> Option<DateTime<Utc>> {
    self.local(key).map(|dt| dt.with_timezone(&Utc))
  }

  fn local(&self, key: &str) -> Option<DateTime<FixedOffset>> {
    let s = self.get(key)?.as_str()?;
    DateTime::parse_from_rfc3339(s)
      .inspect_err(|e| debug!(field = key, value = s, error = %e, "unparseable timestamp"))
      .ok()
  }

  fn date(&self, key: &str) -> Option<NaiveDate> {
    let s = self.get(key)?.as_str()?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
      .inspect_err(|e| debug!(field = key, value = s, error = %e, "unparseable date"))
      .ok()
  }
}

fn strings_of(values: &[Value]) -> Vec<String> {
  values.iter().filter_map(Value::as_str).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
  use chrono::{Datelike, TimeZone};
  use launchdeck_core::launch::LaunchStatus;
  use serde_json::json;

  use super::*;

  #[test]
  fn launch_maps_every_field() {
    let raw = json!({
      "id": "5eb87cd9ffd86e000604b32a",
      "flight_number": 1,
      "name": "FalconSat",
      "date_utc": "2006-03-24T22:30:00.000Z",
      "date_local": "2006-03-25T10:30:00+12:00",
      "success": false,
      "failures": [{"time": 33, "reason": "merlin engine failure"}],
      "upcoming": false,
      "details": "Engine failure at 33 seconds",
      "rocket": "5e9d0d95eda69955f709d1eb",
      "launchpad": "5e9e4502f5090995de566f86",
      "links": {"webcast": "https://youtu.be/0a_00nJ_Y88", "article": null},
      "payloads": ["5eb0e4b5b6c3bb0006eeb1e1"],
      "crew": [],
      "cores": [{"core": "5e9e289df35918033d3b2623"}],
    });

    let l = map_launch(&raw).unwrap();
    assert_eq!(l.external_id, "5eb87cd9ffd86e000604b32a");
    assert_eq!(l.flight_number, Some(1));
    assert_eq!(l.date_utc, Some(Utc.with_ymd_and_hms(2006, 3, 24, 22, 30, 0).unwrap()));
    assert_eq!(l.date_local.unwrap().offset().local_minus_utc(), 12 * 3600);
    assert_eq!(l.date_local.unwrap().day(), 25);
    assert_eq!(l.success, Some(false));
    assert_eq!(l.failures.len(), 1);
    assert_eq!(l.rocket, EntityRef::unresolved(Some("5e9d0d95eda69955f709d1eb".into())));
    assert_eq!(l.launchpad.id.as_deref(), Some("5e9e4502f5090995de566f86"));
    assert_eq!(l.webcast(), Some("https://youtu.be/0a_00nJ_Y88"));
    assert_eq!(l.article(), None);
    assert_eq!(l.payloads.len(), 1);
    assert_eq!(l.cores.len(), 1);
    assert_eq!(l.status(), LaunchStatus::Failure);
  }

  #[test]
  fn launch_defaults_for_missing_and_mistyped_fields() {
    let raw = json!({
      "id": "x",
      "name": "Sparse",
      "flight_number": "twelve",
      "date_utc": "not a date",
      "success": null,
      "links": [],
      "crew": "none",
    });

    let l = map_launch(&raw).unwrap();
    assert_eq!(l.flight_number, None);
    assert_eq!(l.date_utc, None);
    assert_eq!(l.success, None);
    assert!(!l.upcoming);
    assert!(l.links.is_empty());
    assert!(l.crew.is_empty());
    assert_eq!(l.rocket, EntityRef::default());
    assert_eq!(l.status(), LaunchStatus::Unknown);
  }

  #[test]
  fn blank_references_are_absent() {
    let l = map_launch(&json!({"id": "x", "name": "y", "rocket": "", "launchpad": "  "})).unwrap();
    assert_eq!(l.rocket, EntityRef::default());
    assert_eq!(l.launchpad, EntityRef::default());
  }

  #[test]
  fn missing_identity_is_malformed() {
    assert_eq!(map_launch(&json!({"name": "x"})), Err(MalformedRecord::MissingField("id")));
    assert_eq!(map_rocket(&json!({"id": "r"})), Err(MalformedRecord::MissingField("name")));
    assert_eq!(
      map_launchpad(&json!({"id": "p", "name": "  "})),
      Err(MalformedRecord::MissingField("name"))
    );
    assert_eq!(map_rocket(&json!({"id": 7, "name": "x"})), Err(MalformedRecord::MissingField("id")));
    assert_eq!(map_rocket(&json!(["id"])), Err(MalformedRecord::NotAnObject));
  }

  #[test]
  fn rocket_maps_and_defaults_active() {
    let raw = json!({
      "id": "5e9d0d95eda69973a809d1ec",
      "name": "Falcon 9",
      "type": "rocket",
      "stages": 2,
      "boosters": 0,
      "cost_per_launch": 50000000,
      "success_rate_pct": 98,
      "first_flight": "2010-06-04",
      "country": "United States",
      "company": "SpaceX",
      "flickr_images": ["https://imgur.com/a.jpg", 3],
    });

    let r = map_rocket(&raw).unwrap();
    assert!(r.active);
    assert_eq!(r.kind.as_deref(), Some("rocket"));
    assert_eq!(r.stages, Some(2));
    assert_eq!(r.cost_per_launch, Some(50_000_000.0));
    assert_eq!(r.success_rate_pct, Some(98.0));
    assert_eq!(r.first_flight, NaiveDate::from_ymd_opt(2010, 6, 4));
    assert_eq!(r.flickr_images, vec!["https://imgur.com/a.jpg".to_owned()]);

    let inactive = map_rocket(&json!({"id": "f1", "name": "Falcon 1", "active": false})).unwrap();
    assert!(!inactive.active);
  }

  #[test]
  fn launchpad_takes_large_images_and_zero_counts() {
    let raw = json!({
      "id": "5e9e4501f509094ba4566f84",
      "name": "CCSFS SLC 40",
      "full_name": "Cape Canaveral Space Force Station Space Launch Complex 40",
      "latitude": 28.5618571,
      "longitude": -80.577366,
      "status": "active",
      "images": {"large": ["https://i.imgur.com/9oEMXwa.png"], "small": ["s.png"]},
    });

    let p = map_launchpad(&raw).unwrap();
    assert_eq!(p.images, vec!["https://i.imgur.com/9oEMXwa.png".to_owned()]);
    assert_eq!(p.launch_attempts, 0);
    assert_eq!(p.launch_successes, 0);
    assert_eq!(p.latitude, Some(28.5618571));
    assert!(p.is_active());

    let bare = map_launchpad(&json!({"id": "p", "name": "P", "images": ["flat"]})).unwrap();
    assert!(bare.images.is_empty());
  }
}

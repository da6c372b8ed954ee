//! Encoding and decoding helpers between record types and the plain values
//! stored in SQLite columns.
//!
//! UTC timestamps are stored as fixed-width RFC 3339 strings with
//! millisecond precision so that string comparison orders them correctly.
//! Pass-through structures (links, payloads, crew, cores, image lists) are
//! stored as compact JSON.

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use launchdeck_core::{
  launch::{EntityRef, LaunchRecord},
  launchpad::LaunchpadRecord,
  record::Stored,
  rocket::RocketRecord,
};
use rusqlite::{Row, types::Value};
use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(3) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_local_dt(dt: DateTime<FixedOffset>) -> String { dt.to_rfc3339() }

pub fn decode_local_dt(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── JSON columns ────────────────────────────────────────────────────────────

fn json<T: Serialize + ?Sized>(v: &T) -> Result<Value> {
  Ok(Value::Text(serde_json::to_string(v)?))
}

fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> { Ok(serde_json::from_str(s)?) }

// ─── Scalar helpers ──────────────────────────────────────────────────────────

fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

fn opt_text(s: Option<&str>) -> Value { s.map_or(Value::Null, text) }

fn opt_int(n: Option<i64>) -> Value { n.map_or(Value::Null, Value::Integer) }

fn opt_real(n: Option<f64>) -> Value { n.map_or(Value::Null, Value::Real) }

fn boolean(b: bool) -> Value { Value::Integer(i64::from(b)) }

/// Convert a SQL count into an unsigned count.
pub fn count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

// ─── Launches ────────────────────────────────────────────────────────────────

/// Columns written by a sync, in the order [`launch_values`] produces them.
pub const LAUNCH_SYNCED: &[&str] = &[
  "external_id",
  "flight_number",
  "name",
  "date_utc",
  "date_local",
  "success",
  "failures",
  "upcoming",
  "details",
  "rocket_id",
  "rocket_name",
  "launchpad_id",
  "launchpad_name",
  "links",
  "payloads",
  "crew",
  "cores",
];

pub const LAUNCH_COLUMNS: &str = "id, external_id, flight_number, name, date_utc, date_local, \
  success, failures, upcoming, details, rocket_id, rocket_name, launchpad_id, launchpad_name, \
  links, payloads, crew, cores, created_at, updated_at";

pub fn launch_values(r: &LaunchRecord) -> Result<Vec<Value>> {
  Ok(vec![
    text(&r.external_id),
    opt_int(r.flight_number),
    text(&r.name),
    r.date_utc.map_or(Value::Null, |d| Value::Text(encode_dt(d))),
    r.date_local.map_or(Value::Null, |d| Value::Text(encode_local_dt(d))),
    r.success.map_or(Value::Null, boolean),
    json(&r.failures)?,
    boolean(r.upcoming),
    opt_text(r.details.as_deref()),
    opt_text(r.rocket.id.as_deref()),
    opt_text(r.rocket.name.as_deref()),
    opt_text(r.launchpad.id.as_deref()),
    opt_text(r.launchpad.name.as_deref()),
    json(&r.links)?,
    json(&r.payloads)?,
    json(&r.crew)?,
    json(&r.cores)?,
  ])
}

/// Raw values read directly from a `launches` row, in [`LAUNCH_COLUMNS`]
/// order.
pub struct RawLaunch {
  pub id:             i64,
  pub external_id:    String,
  pub flight_number:  Option<i64>,
  pub name:           String,
  pub date_utc:       Option<String>,
  pub date_local:     Option<String>,
  pub success:        Option<bool>,
  pub failures:       String,
  pub upcoming:       bool,
  pub details:        Option<String>,
  pub rocket_id:      Option<String>,
  pub rocket_name:    Option<String>,
  pub launchpad_id:   Option<String>,
  pub launchpad_name: Option<String>,
  pub links:          String,
  pub payloads:       String,
  pub crew:           String,
  pub cores:          String,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawLaunch {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      external_id:    row.get(1)?,
      flight_number:  row.get(2)?,
      name:           row.get(3)?,
      date_utc:       row.get(4)?,
      date_local:     row.get(5)?,
      success:        row.get(6)?,
      failures:       row.get(7)?,
      upcoming:       row.get(8)?,
      details:        row.get(9)?,
      rocket_id:      row.get(10)?,
      rocket_name:    row.get(11)?,
      launchpad_id:   row.get(12)?,
      launchpad_name: row.get(13)?,
      links:          row.get(14)?,
      payloads:       row.get(15)?,
      crew:           row.get(16)?,
      cores:          row.get(17)?,
      created_at:     row.get(18)?,
      updated_at:     row.get(19)?,
    })
  }

  pub fn into_stored(self) -> Result<Stored<LaunchRecord>> {
    let record = LaunchRecord {
      external_id:   self.external_id,
      flight_number: self.flight_number,
      name:          self.name,
      date_utc:      self.date_utc.as_deref().map(decode_dt).transpose()?,
      date_local:    self.date_local.as_deref().map(decode_local_dt).transpose()?,
      success:       self.success,
      failures:      decode_json(&self.failures)?,
      upcoming:      self.upcoming,
      details:       self.details,
      rocket:        EntityRef { id: self.rocket_id, name: self.rocket_name },
      launchpad:     EntityRef { id: self.launchpad_id, name: self.launchpad_name },
      links:         decode_json(&self.links)?,
      payloads:      decode_json(&self.payloads)?,
      crew:          decode_json(&self.crew)?,
      cores:         decode_json(&self.cores)?,
    };
    Ok(Stored {
      id: self.id,
      record,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Rockets ─────────────────────────────────────────────────────────────────

pub const ROCKET_SYNCED: &[&str] = &[
  "external_id",
  "name",
  "type",
  "active",
  "stages",
  "boosters",
  "cost_per_launch",
  "success_rate_pct",
  "first_flight",
  "country",
  "company",
  "wikipedia",
  "description",
  "flickr_images",
];

pub const ROCKET_COLUMNS: &str = "id, external_id, name, type, active, stages, boosters, \
  cost_per_launch, success_rate_pct, first_flight, country, company, wikipedia, description, \
  flickr_images, created_at, updated_at";

pub fn rocket_values(r: &RocketRecord) -> Result<Vec<Value>> {
  Ok(vec![
    text(&r.external_id),
    text(&r.name),
    opt_text(r.kind.as_deref()),
    boolean(r.active),
    opt_int(r.stages),
    opt_int(r.boosters),
    opt_real(r.cost_per_launch),
    opt_real(r.success_rate_pct),
    r.first_flight
      .map_or(Value::Null, |d| Value::Text(d.format("%Y-%m-%d").to_string())),
    opt_text(r.country.as_deref()),
    opt_text(r.company.as_deref()),
    opt_text(r.wikipedia.as_deref()),
    opt_text(r.description.as_deref()),
    json(&r.flickr_images)?,
  ])
}

pub struct RawRocket {
  pub id:               i64,
  pub external_id:      String,
  pub name:             String,
  pub kind:             Option<String>,
  pub active:           bool,
  pub stages:           Option<i64>,
  pub boosters:         Option<i64>,
  pub cost_per_launch:  Option<f64>,
  pub success_rate_pct: Option<f64>,
  pub first_flight:     Option<String>,
  pub country:          Option<String>,
  pub company:          Option<String>,
  pub wikipedia:        Option<String>,
  pub description:      Option<String>,
  pub flickr_images:    String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawRocket {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      external_id:      row.get(1)?,
      name:             row.get(2)?,
      kind:             row.get(3)?,
      active:           row.get(4)?,
      stages:           row.get(5)?,
      boosters:         row.get(6)?,
      cost_per_launch:  row.get(7)?,
      success_rate_pct: row.get(8)?,
      first_flight:     row.get(9)?,
      country:          row.get(10)?,
      company:          row.get(11)?,
      wikipedia:        row.get(12)?,
      description:      row.get(13)?,
      flickr_images:    row.get(14)?,
      created_at:       row.get(15)?,
      updated_at:       row.get(16)?,
    })
  }

  pub fn into_stored(self) -> Result<Stored<RocketRecord>> {
    let record = RocketRecord {
      external_id:      self.external_id,
      name:             self.name,
      kind:             self.kind,
      active:           self.active,
      stages:           self.stages,
      boosters:         self.boosters,
      cost_per_launch:  self.cost_per_launch,
      success_rate_pct: self.success_rate_pct,
      first_flight:     self.first_flight.as_deref().map(decode_date).transpose()?,
      country:          self.country,
      company:          self.company,
      wikipedia:        self.wikipedia,
      description:      self.description,
      flickr_images:    decode_json(&self.flickr_images)?,
    };
    Ok(Stored {
      id: self.id,
      record,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Launchpads ──────────────────────────────────────────────────────────────

pub const LAUNCHPAD_SYNCED: &[&str] = &[
  "external_id",
  "name",
  "full_name",
  "locality",
  "region",
  "latitude",
  "longitude",
  "launch_attempts",
  "launch_successes",
  "status",
  "details",
  "images",
];

pub const LAUNCHPAD_COLUMNS: &str = "id, external_id, name, full_name, locality, region, \
  latitude, longitude, launch_attempts, launch_successes, status, details, images, \
  created_at, updated_at";

pub fn launchpad_values(r: &LaunchpadRecord) -> Result<Vec<Value>> {
  Ok(vec![
    text(&r.external_id),
    text(&r.name),
    opt_text(r.full_name.as_deref()),
    opt_text(r.locality.as_deref()),
    opt_text(r.region.as_deref()),
    opt_real(r.latitude),
    opt_real(r.longitude),
    Value::Integer(r.launch_attempts),
    Value::Integer(r.launch_successes),
    opt_text(r.status.as_deref()),
    opt_text(r.details.as_deref()),
    json(&r.images)?,
  ])
}

pub struct RawLaunchpad {
  pub id:               i64,
  pub external_id:      String,
  pub name:             String,
  pub full_name:        Option<String>,
  pub locality:         Option<String>,
  pub region:           Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub launch_attempts:  i64,
  pub launch_successes: i64,
  pub status:           Option<String>,
  pub details:          Option<String>,
  pub images:           String,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawLaunchpad {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      external_id:      row.get(1)?,
      name:             row.get(2)?,
      full_name:        row.get(3)?,
      locality:         row.get(4)?,
      region:           row.get(5)?,
      latitude:         row.get(6)?,
      longitude:        row.get(7)?,
      launch_attempts:  row.get(8)?,
      launch_successes: row.get(9)?,
      status:           row.get(10)?,
      details:          row.get(11)?,
      images:           row.get(12)?,
      created_at:       row.get(13)?,
      updated_at:       row.get(14)?,
    })
  }

  pub fn into_stored(self) -> Result<Stored<LaunchpadRecord>> {
    let record = LaunchpadRecord {
      external_id:      self.external_id,
      name:             self.name,
      full_name:        self.full_name,
      locality:         self.locality,
      region:           self.region,
      latitude:         self.latitude,
      longitude:        self.longitude,
      launch_attempts:  self.launch_attempts,
      launch_successes: self.launch_successes,
      status:           self.status,
      details:          self.details,
      images:           decode_json(&self.images)?,
    };
    Ok(Stored {
      id: self.id,
      record,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

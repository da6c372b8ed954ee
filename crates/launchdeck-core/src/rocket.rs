//! Rocket records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A rocket as normalised from upstream. `external_id` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketRecord {
  pub external_id:      String,
  pub name:             String,
  #[serde(rename = "type")]
  pub kind:             Option<String>,
  pub active:           bool,
  pub stages:           Option<i64>,
  pub boosters:         Option<i64>,
  /// USD.
  pub cost_per_launch:  Option<f64>,
  pub success_rate_pct: Option<f64>,
  pub first_flight:     Option<NaiveDate>,
  pub country:          Option<String>,
  pub company:          Option<String>,
  pub wikipedia:        Option<String>,
  pub description:      Option<String>,
  pub flickr_images:    Vec<String>,
}

impl RocketRecord {
  pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      external_id:      external_id.into(),
      name:             name.into(),
      kind:             None,
      active:           true,
      stages:           None,
      boosters:         None,
      cost_per_launch:  None,
      success_rate_pct: None,
      first_flight:     None,
      country:          None,
      company:          None,
      wikipedia:        None,
      description:      None,
      flickr_images:    Vec::new(),
    }
  }
}

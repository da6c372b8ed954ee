//! Launchpad records.

use serde::{Deserialize, Serialize};

use crate::query::success_rate;

/// A launchpad as normalised from upstream. `external_id` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchpadRecord {
  pub external_id:      String,
  pub name:             String,
  pub full_name:        Option<String>,
  pub locality:         Option<String>,
  pub region:           Option<String>,
  pub latitude:         Option<f64>,
  pub longitude:        Option<f64>,
  pub launch_attempts:  i64,
  pub launch_successes: i64,
  /// `"active"`, `"retired"`, `"under construction"`, ...
  pub status:           Option<String>,
  pub details:          Option<String>,
  pub images:           Vec<String>,
}

impl LaunchpadRecord {
  pub const ACTIVE_STATUS: &'static str = "active";

  pub fn new(external_id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      external_id:      external_id.into(),
      name:             name.into(),
      full_name:        None,
      locality:         None,
      region:           None,
      latitude:         None,
      longitude:        None,
      launch_attempts:  0,
      launch_successes: 0,
      status:           None,
      details:          None,
      images:           Vec::new(),
    }
  }

  pub fn is_active(&self) -> bool {
    self.status.as_deref() == Some(Self::ACTIVE_STATUS)
  }

  /// Percentage of attempts that succeeded, rounded to two places.
  pub fn success_rate(&self) -> f64 {
    success_rate(
      self.launch_successes.max(0) as u64,
      self.launch_attempts.max(0) as u64,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn success_rate_handles_zero_attempts() {
    let pad = LaunchpadRecord::new("p", "Kwajalein Atoll");
    assert_eq!(pad.success_rate(), 0.0);
  }

  #[test]
  fn success_rate_rounds_to_two_places() {
    let mut pad = LaunchpadRecord::new("p", "Kwajalein Atoll");
    pad.launch_attempts = 5;
    pad.launch_successes = 2;
    assert_eq!(pad.success_rate(), 40.0);
    pad.launch_attempts = 3;
    pad.launch_successes = 1;
    assert_eq!(pad.success_rate(), 33.33);
  }
}

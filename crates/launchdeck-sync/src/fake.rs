//! In-memory transport for unit tests.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
  time::Duration,
};

use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::{
  clock::ManualClock,
  error::{Error, Result},
  transport::{RawResponse, Request, Transport},
};

pub fn clock() -> ManualClock {
  ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

/// Serves canned responses by path and counts calls per path. Paths with no
/// canned response behave like an unreachable host.
#[derive(Debug, Default)]
pub struct FakeTransport {
  routes:       HashMap<String, RawResponse>,
  calls:        Mutex<HashMap<String, usize>>,
  last_timeout: Mutex<Option<Duration>>,
}

impl FakeTransport {
  pub fn new() -> Self { Self::default() }

  pub fn with_status(mut self, path: &str, status: u16, body: &str) -> Self {
    self.routes.insert(path.to_owned(), RawResponse { status, body: body.to_owned() });
    self
  }

  pub fn with_json(self, path: &str, body: Value) -> Self {
    self.with_status(path, 200, &body.to_string())
  }

  pub fn calls(&self, path: &str) -> usize {
    self.calls.lock().unwrap_or_else(PoisonError::into_inner).get(path).copied().unwrap_or(0)
  }

  /// Calls to any path starting with `prefix`.
  pub fn calls_under(&self, prefix: &str) -> usize {
    self
      .calls
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .iter()
      .filter(|(path, _)| path.starts_with(prefix))
      .map(|(_, n)| n)
      .sum()
  }

  pub fn last_timeout(&self) -> Option<Duration> {
    *self.last_timeout.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl Transport for FakeTransport {
  async fn get(&self, request: &Request) -> Result<RawResponse> {
    *self.calls.lock().unwrap_or_else(PoisonError::into_inner).entry(request.path.clone()).or_default() +=
      1;
    *self.last_timeout.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.timeout);
    self
      .routes
      .get(&request.path)
      .cloned()
      .ok_or_else(|| Error::UpstreamUnavailable(format!("no route to {}", request.path)))
  }
}

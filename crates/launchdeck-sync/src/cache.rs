//! Time-bounded cache of parsed upstream responses.
//!
//! Keyed by request path plus canonicalised query. An entry is fresh while
//! `now - fetched_at < ttl`; a TTL of zero therefore never hits. Stale
//! entries are dropped on the read that finds them.

use std::{
  collections::HashMap,
  fmt,
  sync::{Mutex, MutexGuard, PoisonError},
  time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;

use crate::clock::Clock;

// ─── Key ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
  path:  String,
  query: Vec<(String, String)>,
}

impl CacheKey {
  /// Query pairs are sorted so that parameter order does not split the cache.
  pub fn new(path: impl Into<String>, query: &[(String, String)]) -> Self {
    let mut query = query.to_vec();
    query.sort();
    Self { path: path.into(), query }
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path)?;
    for (i, (k, v)) in self.query.iter().enumerate() {
      write!(f, "{}{k}={v}", if i == 0 { '?' } else { '&' })?;
    }
    Ok(())
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Entry {
  payload:    Value,
  fetched_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ResponseCache<C> {
  ttl:     TimeDelta,
  clock:   C,
  entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl<C: Clock> ResponseCache<C> {
  pub fn new(ttl: Duration, clock: C) -> Self {
    Self {
      ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
      clock,
      entries: Mutex::new(HashMap::new()),
    }
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The cached payload for `key` if one is present and still fresh.
  pub fn get(&self, key: &CacheKey) -> Option<Value> {
    let now = self.clock.now();
    let mut entries = self.entries();
    match entries.get(key) {
      Some(entry) if now - entry.fetched_at < self.ttl => Some(entry.payload.clone()),
      Some(_) => {
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  /// Store `payload` under `key`, replacing any previous entry.
  pub fn put(&self, key: CacheKey, payload: Value) {
    let fetched_at = self.clock.now();
    self.entries().insert(key, Entry { payload, fetched_at });
  }

  /// Drop one entry. Returns whether it was present.
  pub fn evict(&self, key: &CacheKey) -> bool { self.entries().remove(key).is_some() }

  /// Drop every entry. Returns how many there were.
  pub fn clear(&self) -> usize {
    let mut entries = self.entries();
    let n = entries.len();
    entries.clear();
    n
  }

  pub fn len(&self) -> usize { self.entries().len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;
  use crate::clock::ManualClock;

  fn clock() -> ManualClock { ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()) }

  fn key(path: &str) -> CacheKey { CacheKey::new(path, &[]) }

  #[test]
  fn query_order_does_not_matter() {
    let a = CacheKey::new("/v5/launches", &[("b".into(), "2".into()), ("a".into(), "1".into())]);
    let b = CacheKey::new("/v5/launches", &[("a".into(), "1".into()), ("b".into(), "2".into())]);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), "/v5/launches?a=1&b=2");
    assert_eq!(key("/v4/rockets").to_string(), "/v4/rockets");
  }

  #[test]
  fn values_containing_separators_stay_distinct() {
    let one = CacheKey::new("/v5/launches", &[("a".into(), "1&b=2".into())]);
    let two = CacheKey::new("/v5/launches", &[("a".into(), "1".into()), ("b".into(), "2".into())]);
    assert_ne!(one, two);

    let cache = ResponseCache::new(Duration::from_secs(60), clock());
    cache.put(one.clone(), json!("one"));
    assert_eq!(cache.get(&two), None);
    assert_eq!(cache.get(&one), Some(json!("one")));
  }

  #[test]
  fn entry_expires_exactly_at_ttl() {
    let clock = clock();
    let cache = ResponseCache::new(Duration::from_secs(60), clock.clone());
    cache.put(key("/v4/rockets"), json!([1]));

    clock.advance(Duration::from_secs(59));
    assert_eq!(cache.get(&key("/v4/rockets")), Some(json!([1])));

    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get(&key("/v4/rockets")), None);
    assert!(cache.is_empty(), "stale entry is dropped on read");
  }

  #[test]
  fn zero_ttl_never_hits() {
    let cache = ResponseCache::new(Duration::ZERO, clock());
    cache.put(key("/v4/rockets"), json!([]));
    assert_eq!(cache.get(&key("/v4/rockets")), None);
  }

  #[test]
  fn evict_and_clear() {
    let cache = ResponseCache::new(Duration::from_secs(60), clock());
    cache.put(key("/a"), json!(1));
    cache.put(key("/b"), json!(2));
    cache.put(key("/c"), json!(3));

    assert!(cache.evict(&key("/a")));
    assert!(!cache.evict(&key("/a")));
    assert_eq!(cache.clear(), 2);
    assert!(cache.is_empty());
  }
}

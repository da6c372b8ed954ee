//! Per-run memo of rocket and launchpad display names.
//!
//! Launches reference rockets and launchpads by ID. Within one sync run each
//! distinct ID is looked up upstream at most once, failures included: a
//! lookup that fails resolves to `None` and is not retried until the next
//! run. Successive upstream requests are spaced by the configured delay;
//! lookups answered by the response cache are not delayed.

use std::{collections::HashMap, time::Duration};

use launchdeck_core::entity::EntityKind;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
  clock::Clock,
  transport::Transport,
  upstream::{Endpoint, UpstreamClient},
};

pub struct NameResolutionCache<'c, T, C> {
  client:   &'c UpstreamClient<T, C>,
  throttle: Duration,
  names:    HashMap<(EntityKind, String), Option<String>>,
  requests: usize,
}

impl<'c, T: Transport, C: Clock> NameResolutionCache<'c, T, C> {
  pub fn new(client: &'c UpstreamClient<T, C>, throttle: Duration) -> Self {
    Self { client, throttle, names: HashMap::new(), requests: 0 }
  }

  /// The display name of `kind`/`id`, or `None` if upstream could not
  /// provide one.
  pub async fn resolve(&mut self, kind: EntityKind, id: &str) -> Option<String> {
    let key = (kind, id.to_owned());
    if let Some(name) = self.names.get(&key) {
      return name.clone();
    }

    if !is_path_safe(id) {
      debug!(%kind, id, "reference is not a valid upstream ID; leaving unresolved");
      self.names.insert(key, None);
      return None;
    }

    if !self.client.is_cached(&Endpoint::Item(kind, id.to_owned()), &[]) {
      if self.requests > 0 && !self.throttle.is_zero() {
        tokio::time::sleep(self.throttle).await;
      }
      self.requests += 1;
    }

    let name = match self.client.fetch_item(kind, id).await {
      Ok(raw) => {
        let name = raw.get("name").and_then(Value::as_str).map(str::to_owned);
        if name.is_none() {
          debug!(%kind, id, "upstream record has no name");
        }
        name
      }
      Err(e) => {
        warn!(%kind, id, error = %e, "name lookup failed; leaving unresolved");
        None
      }
    };
    self.names.insert(key, name.clone());
    name
  }

  /// Upstream requests made so far in this run. Cache hits are not counted.
  pub fn requests(&self) -> usize { self.requests }
}

fn is_path_safe(id: &str) -> bool {
  !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{
    config::UpstreamConfig,
    fake::{FakeTransport, clock},
  };

  // A zero TTL keeps the response cache out of the way so only the memo is
  // being tested.
  fn uncached(fake: FakeTransport) -> UpstreamClient<FakeTransport, crate::clock::ManualClock> {
    UpstreamClient::new(fake, clock(), &UpstreamConfig { cache_time: 0, ..Default::default() })
  }

  #[tokio::test]
  async fn each_id_is_looked_up_once() {
    let client = uncached(
      FakeTransport::new()
        .with_json("/v4/rockets/r9", json!({"id": "r9", "name": "Falcon 9"}))
        .with_json("/v4/launchpads/r9", json!({"id": "r9", "name": "Same ID, other kind"})),
    );
    let mut names = NameResolutionCache::new(&client, Duration::ZERO);

    assert_eq!(names.resolve(EntityKind::Rocket, "r9").await.as_deref(), Some("Falcon 9"));
    assert_eq!(names.resolve(EntityKind::Rocket, "r9").await.as_deref(), Some("Falcon 9"));
    assert_eq!(
      names.resolve(EntityKind::Launchpad, "r9").await.as_deref(),
      Some("Same ID, other kind")
    );

    assert_eq!(client.transport().calls("/v4/rockets/r9"), 1);
    assert_eq!(names.requests(), 2);
  }

  #[tokio::test]
  async fn failed_lookup_is_not_retried_in_the_same_run() {
    let client = uncached(FakeTransport::new().with_status("/v4/rockets/gone", 404, "{}"));
    let mut names = NameResolutionCache::new(&client, Duration::ZERO);

    assert_eq!(names.resolve(EntityKind::Rocket, "gone").await, None);
    assert_eq!(names.resolve(EntityKind::Rocket, "gone").await, None);
    assert_eq!(client.transport().calls("/v4/rockets/gone"), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn lookups_after_the_first_are_throttled() {
    let client = uncached(
      FakeTransport::new()
        .with_json("/v4/rockets/a", json!({"name": "A"}))
        .with_json("/v4/rockets/b", json!({"name": "B"})),
    );
    let mut names = NameResolutionCache::new(&client, Duration::from_secs(1));

    let start = tokio::time::Instant::now();
    names.resolve(EntityKind::Rocket, "a").await;
    assert_eq!(start.elapsed(), Duration::ZERO);
    names.resolve(EntityKind::Rocket, "b").await;
    assert!(start.elapsed() >= Duration::from_secs(1));
    names.resolve(EntityKind::Rocket, "a").await;
    assert!(start.elapsed() < Duration::from_secs(2), "memo hits are not throttled");
  }

  #[tokio::test(start_paused = true)]
  async fn cached_lookups_are_not_throttled() {
    let client = UpstreamClient::new(
      FakeTransport::new()
        .with_json("/v4/rockets/a", json!({"name": "A"}))
        .with_json("/v4/rockets/b", json!({"name": "B"}))
        .with_json("/v4/launchpads/c", json!({"name": "C"})),
      clock(),
      &UpstreamConfig::default(),
    );

    let mut warm = NameResolutionCache::new(&client, Duration::from_secs(1));
    for (kind, id) in [(EntityKind::Rocket, "a"), (EntityKind::Rocket, "b")] {
      warm.resolve(kind, id).await;
    }
    assert_eq!(warm.requests(), 2);

    let mut names = NameResolutionCache::new(&client, Duration::from_secs(1));
    let start = tokio::time::Instant::now();
    assert_eq!(names.resolve(EntityKind::Rocket, "a").await.as_deref(), Some("A"));
    assert_eq!(names.resolve(EntityKind::Rocket, "b").await.as_deref(), Some("B"));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(names.requests(), 0);

    // The first real request of the run goes out immediately too.
    assert_eq!(names.resolve(EntityKind::Launchpad, "c").await.as_deref(), Some("C"));
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(names.requests(), 1);
    assert_eq!(client.transport().calls("/v4/rockets/a"), 1);
  }

  #[tokio::test]
  async fn ids_that_are_not_path_safe_are_never_requested() {
    let client = uncached(FakeTransport::new().with_json("/v4/rockets", json!([])));
    let mut names = NameResolutionCache::new(&client, Duration::ZERO);

    for id in ["", " ", "../rockets", "a/b", "x?limit=1"] {
      assert_eq!(names.resolve(EntityKind::Rocket, id).await, None, "{id:?}");
    }
    assert_eq!(names.requests(), 0);
    assert_eq!(client.transport().calls_under("/v4/rockets"), 0);
  }
}

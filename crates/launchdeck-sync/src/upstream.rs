//! Cached client for the upstream launch API.
//!
//! Every read goes through [`UpstreamClient::fetch`]: a fresh cache entry is
//! returned without touching the network; otherwise the transport is called
//! and a successful, well-formed payload is cached. Failures are never
//! cached.

use std::{fmt, time::Duration};

use launchdeck_core::entity::EntityKind;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::{
  cache::{CacheKey, ResponseCache},
  clock::{Clock, SystemClock},
  config::UpstreamConfig,
  error::{Error, Result},
  transport::{HttpTransport, Request, Transport},
};

// ─── Endpoints ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
  /// Every record of a kind.
  Collection(EntityKind),
  /// One record of a kind by external ID.
  Item(EntityKind, String),
  /// Company info. Only used as a liveness probe.
  Company,
}

impl Endpoint {
  pub fn path(&self) -> String {
    match self {
      Self::Collection(kind) => format!("/v{}/{}", kind.api_version(), kind.collection()),
      Self::Item(kind, id) => format!("/v{}/{}/{id}", kind.api_version(), kind.collection()),
      Self::Company => "/v4/company".to_owned(),
    }
  }
}

impl fmt::Display for Endpoint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.path()) }
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct UpstreamClient<T = HttpTransport, C = SystemClock> {
  transport:      T,
  cache:          ResponseCache<C>,
  timeout:        Duration,
  health_timeout: Duration,
}

impl UpstreamClient {
  /// A reqwest-backed client on the system clock.
  pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
    Ok(Self::new(HttpTransport::new(&config.api_base_url)?, SystemClock, config))
  }
}

impl<T: Transport, C: Clock> UpstreamClient<T, C> {
  pub fn new(transport: T, clock: C, config: &UpstreamConfig) -> Self {
    Self {
      transport,
      cache: ResponseCache::new(config.cache_ttl(), clock),
      timeout: config.timeout(),
      health_timeout: config.health_check_timeout(),
    }
  }

  pub fn transport(&self) -> &T { &self.transport }

  pub fn cache(&self) -> &ResponseCache<C> { &self.cache }

  /// Whether [`fetch`](Self::fetch) would answer `endpoint` from cache right
  /// now, without a network call.
  pub fn is_cached(&self, endpoint: &Endpoint, query: &[(String, String)]) -> bool {
    self.cache.get(&CacheKey::new(endpoint.path(), query)).is_some()
  }

  /// Return the parsed payload for `endpoint`, from cache when fresh.
  pub async fn fetch(&self, endpoint: &Endpoint, query: &[(String, String)]) -> Result<Value> {
    let key = CacheKey::new(endpoint.path(), query);
    if let Some(payload) = self.cache.get(&key) {
      debug!(%key, "upstream cache hit");
      return Ok(payload);
    }

    info!(%key, "upstream request");
    let request = Request { path: endpoint.path(), query: query.to_vec(), timeout: self.timeout };
    let resp = self.transport.get(&request).await.inspect_err(|e| {
      error!(%key, error = %e, "upstream request failed");
    })?;

    if !resp.is_success() {
      error!(%key, status = resp.status, "upstream returned an error status");
      return Err(Error::UpstreamError { status: resp.status, body: resp.body });
    }

    let payload: Value = serde_json::from_str(&resp.body)
      .map_err(|e| Error::UpstreamMalformed(format!("{key}: {e}")))?;
    if payload.is_null() {
      return Err(Error::UpstreamMalformed(format!("{key}: null body")));
    }

    info!(%key, count = payload.as_array().map_or(1, Vec::len), "upstream response received");
    self.cache.put(key, payload.clone());
    Ok(payload)
  }

  /// Every record of `kind`. The payload must be a JSON array.
  pub async fn fetch_collection(&self, kind: EntityKind) -> Result<Vec<Value>> {
    let endpoint = Endpoint::Collection(kind);
    match self.fetch(&endpoint, &[]).await? {
      Value::Array(items) => Ok(items),
      other => Err(Error::UpstreamMalformed(format!(
        "{endpoint}: expected an array, got {}",
        json_type(&other)
      ))),
    }
  }

  /// One record of `kind` by external ID.
  pub async fn fetch_item(&self, kind: EntityKind, id: &str) -> Result<Value> {
    self.fetch(&Endpoint::Item(kind, id.to_owned()), &[]).await
  }

  pub async fn launches(&self) -> Result<Vec<Value>> {
    self.fetch_collection(EntityKind::Launch).await
  }

  pub async fn rockets(&self) -> Result<Vec<Value>> {
    self.fetch_collection(EntityKind::Rocket).await
  }

  pub async fn launchpads(&self) -> Result<Vec<Value>> {
    self.fetch_collection(EntityKind::Launchpad).await
  }

  /// Drop every cached response. Returns how many were dropped.
  pub fn clear_cache(&self) -> usize {
    let n = self.cache.clear();
    info!(entries = n, "upstream cache cleared");
    n
  }

  /// Whether upstream answers the company endpoint with a 2xx in time.
  /// Bypasses the response cache.
  pub async fn health_check(&self) -> bool {
    let request =
      Request { path: Endpoint::Company.path(), query: Vec::new(), timeout: self.health_timeout };
    match self.transport.get(&request).await {
      Ok(resp) if resp.is_success() => true,
      Ok(resp) => {
        warn!(status = resp.status, "upstream health check failed");
        false
      }
      Err(e) => {
        warn!(error = %e, "upstream health check failed");
        false
      }
    }
  }
}

fn json_type(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "a boolean",
    Value::Number(_) => "a number",
    Value::String(_) => "a string",
    Value::Array(_) => "an array",
    Value::Object(_) => "an object",
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use serde_json::json;

  use super::*;
  use crate::fake::{FakeTransport, clock};

  fn client(fake: FakeTransport) -> UpstreamClient<FakeTransport, crate::clock::ManualClock> {
    UpstreamClient::new(fake, clock(), &UpstreamConfig::default())
  }

  #[test]
  fn endpoint_paths() {
    assert_eq!(Endpoint::Collection(EntityKind::Launch).path(), "/v5/launches");
    assert_eq!(Endpoint::Collection(EntityKind::Rocket).path(), "/v4/rockets");
    assert_eq!(Endpoint::Item(EntityKind::Launchpad, "x".into()).path(), "/v4/launchpads/x");
    assert_eq!(Endpoint::Company.path(), "/v4/company");
  }

  #[tokio::test]
  async fn second_fetch_within_ttl_is_served_from_cache() {
    let fake = FakeTransport::new().with_json("/v4/rockets", json!([{"id": "r1"}]));
    let client = client(fake);

    let first = client.rockets().await.unwrap();
    let second = client.rockets().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(client.transport().calls("/v4/rockets"), 1);
  }

  #[tokio::test]
  async fn expired_entry_triggers_exactly_one_refetch() {
    let fake = FakeTransport::new().with_json("/v4/rockets", json!([]));
    let clock = clock();
    let client = UpstreamClient::new(fake, clock.clone(), &UpstreamConfig::default());

    client.rockets().await.unwrap();
    clock.advance(Duration::from_secs(3599));
    client.rockets().await.unwrap();
    assert_eq!(client.transport().calls("/v4/rockets"), 1);

    clock.advance(Duration::from_secs(1));
    client.rockets().await.unwrap();
    client.rockets().await.unwrap();
    assert_eq!(client.transport().calls("/v4/rockets"), 2);
  }

  #[tokio::test]
  async fn clear_cache_forces_a_refetch() {
    let fake = FakeTransport::new().with_json("/v4/rockets", json!([]));
    let client = client(fake);

    client.rockets().await.unwrap();
    assert_eq!(client.clear_cache(), 1);
    client.rockets().await.unwrap();
    assert_eq!(client.transport().calls("/v4/rockets"), 2);
  }

  #[tokio::test]
  async fn error_status_is_reported_and_not_cached() {
    let fake = FakeTransport::new().with_status("/v5/launches", 503, "down");
    let client = client(fake);

    let err = client.launches().await.unwrap_err();
    assert!(matches!(err, Error::UpstreamError { status: 503, .. }), "{err:?}");
    client.launches().await.unwrap_err();
    assert_eq!(client.transport().calls("/v5/launches"), 2);
    assert!(client.cache().is_empty());
  }

  #[tokio::test]
  async fn unreachable_upstream_is_unavailable() {
    let client = client(FakeTransport::new());
    let err = client.fetch_item(EntityKind::Rocket, "nope").await.unwrap_err();
    assert!(matches!(err, Error::UpstreamUnavailable(_)), "{err:?}");
  }

  #[tokio::test]
  async fn null_and_garbage_bodies_are_malformed() {
    let fake = FakeTransport::new()
      .with_status("/v4/rockets/a", 200, "null")
      .with_status("/v4/rockets/b", 200, "<html>")
      .with_json("/v4/launchpads", json!({"not": "a list"}));
    let client = client(fake);

    for id in ["a", "b"] {
      let result = client.fetch_item(EntityKind::Rocket, id).await;
      assert!(matches!(result, Err(Error::UpstreamMalformed(_))), "{id}: {result:?}");
    }
    assert!(matches!(client.launchpads().await, Err(Error::UpstreamMalformed(_))));
  }

  #[tokio::test]
  async fn health_check_bypasses_cache_and_reports_bool() {
    let fake = FakeTransport::new().with_json("/v4/company", json!({"name": "SpaceX"}));
    let client = client(fake);
    assert!(client.health_check().await);
    assert!(client.health_check().await);
    assert_eq!(client.transport().calls("/v4/company"), 2);

    let down = UpstreamClient::new(
      FakeTransport::new().with_status("/v4/company", 500, ""),
      clock(),
      &UpstreamConfig::default(),
    );
    assert!(!down.health_check().await);
    assert!(!client_without_routes().health_check().await);
  }

  fn client_without_routes() -> UpstreamClient<FakeTransport, crate::clock::ManualClock> {
    client(FakeTransport::new())
  }

  #[tokio::test]
  async fn health_check_uses_the_short_timeout() {
    let fake = FakeTransport::new().with_json("/v4/company", json!({}));
    let client = client(fake);
    client.health_check().await;
    assert_eq!(client.transport().last_timeout(), Some(Duration::from_secs(5)));

    client.rockets().await.ok();
    assert_eq!(client.transport().last_timeout(), Some(Duration::from_secs(30)));
  }
}

//! [`SyncService`], the entry point for everything outside this crate.

use std::sync::Arc;

use launchdeck_core::{entity::EntityKind, store::RecordStore, tally::SyncTally};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::{
  clock::{Clock, SystemClock},
  config::{SyncConfig, UpstreamConfig},
  coordinator::SyncCoordinator,
  error::Result,
  transport::{HttpTransport, Transport},
  upstream::UpstreamClient,
};

/// Owns the upstream client (and with it the response cache) and a handle
/// to the store. Cloning shares both.
pub struct SyncService<S, T = HttpTransport, C = SystemClock> {
  store:  Arc<S>,
  client: Arc<UpstreamClient<T, C>>,
  config: SyncConfig,
}

impl<S, T, C> Clone for SyncService<S, T, C> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), client: self.client.clone(), config: self.config.clone() }
  }
}

impl<S: RecordStore> SyncService<S> {
  /// A service talking to the real upstream described by `config`.
  pub fn from_config(store: Arc<S>, config: &UpstreamConfig) -> Result<Self> {
    Ok(Self::new(store, UpstreamClient::from_config(config)?, config.sync.clone()))
  }
}

impl<S, T, C> SyncService<S, T, C>
where
  S: RecordStore,
  T: Transport,
  C: Clock,
{
  pub fn new(store: Arc<S>, client: UpstreamClient<T, C>, config: SyncConfig) -> Self {
    Self { store, client: Arc::new(client), config }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn client(&self) -> &UpstreamClient<T, C> { &self.client }

  fn coordinator(&self) -> SyncCoordinator<'_, S, T, C> {
    SyncCoordinator::new(&self.store, &self.client, &self.config)
  }

  pub async fn sync(&self, kind: EntityKind) -> Result<SyncTally> {
    self.coordinator().sync(kind).await
  }

  pub async fn sync_launches(&self) -> Result<SyncTally> { self.coordinator().sync_launches().await }

  pub async fn sync_rockets(&self) -> Result<SyncTally> { self.coordinator().sync_rockets().await }

  pub async fn sync_launchpads(&self) -> Result<SyncTally> {
    self.coordinator().sync_launchpads().await
  }

  /// Rockets, then launchpads, then launches. Stops at the first failed run.
  pub async fn sync_all(&self) -> Result<Vec<SyncTally>> {
    let mut tallies = Vec::with_capacity(EntityKind::ALL.len());
    for kind in EntityKind::ALL {
      tallies.push(self.sync(kind).await?);
    }
    Ok(tallies)
  }

  pub fn clear_upstream_cache(&self) -> usize { self.client.clear_cache() }

  pub async fn upstream_health_check(&self) -> bool { self.client.health_check().await }
}

impl<S, T, C> SyncService<S, T, C>
where
  S: RecordStore + 'static,
  T: Transport + 'static,
  C: Clock + 'static,
{
  /// Run a sync on its own task. The run continues to completion even if the
  /// returned handle is dropped. `None` syncs every kind.
  pub fn spawn_sync(&self, kind: Option<EntityKind>) -> JoinHandle<Result<Vec<SyncTally>>> {
    let service = self.clone();
    tokio::spawn(async move {
      let result = match kind {
        Some(kind) => service.sync(kind).await.map(|t| vec![t]),
        None => service.sync_all().await,
      };
      match &result {
        Ok(tallies) => info!(runs = tallies.len(), "background sync finished"),
        Err(e) => error!(error = %e, "background sync failed"),
      }
      result
    })
  }
}

#[cfg(test)]
mod tests {
  use launchdeck_store_sqlite::SqliteStore;
  use serde_json::json;

  use super::*;
  use crate::{
    clock::ManualClock,
    fake::{FakeTransport, clock},
  };

  async fn service(fake: FakeTransport) -> SyncService<SqliteStore, FakeTransport, ManualClock> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let client = UpstreamClient::new(fake, clock(), &UpstreamConfig::default());
    SyncService::new(store, client, SyncConfig::unthrottled())
  }

  fn upstream() -> FakeTransport {
    FakeTransport::new()
      .with_json("/v4/rockets", json!([{"id": "r9", "name": "Falcon 9"}]))
      .with_json("/v4/launchpads", json!([{"id": "p40", "name": "SLC 40"}]))
      .with_json("/v5/launches", json!([{"id": "l1", "name": "CRS-1", "rocket": "r9"}]))
      .with_json("/v4/rockets/r9", json!({"id": "r9", "name": "Falcon 9"}))
  }

  #[tokio::test]
  async fn sync_all_runs_every_kind_in_order() {
    let svc = service(upstream()).await;
    let tallies = svc.sync_all().await.unwrap();

    let kinds: Vec<_> = tallies.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![EntityKind::Rocket, EntityKind::Launchpad, EntityKind::Launch]);
    assert!(tallies.iter().all(|t| t.created == 1));
  }

  #[tokio::test]
  async fn sync_all_stops_at_first_failure() {
    let fake = FakeTransport::new()
      .with_json("/v4/rockets", json!([]))
      .with_status("/v4/launchpads", 500, "boom");
    let svc = service(fake).await;

    let err = svc.sync_all().await.unwrap_err();
    assert_eq!(err.upstream_status(), Some(500));
    assert_eq!(svc.client().transport().calls("/v5/launches"), 0);
  }

  #[tokio::test]
  async fn clear_cache_then_fetch_calls_upstream_again() {
    let svc = service(upstream()).await;
    svc.sync_rockets().await.unwrap();
    svc.sync_rockets().await.unwrap();
    assert_eq!(svc.client().transport().calls("/v4/rockets"), 1);

    assert_eq!(svc.clear_upstream_cache(), 1);
    svc.sync_rockets().await.unwrap();
    assert_eq!(svc.client().transport().calls("/v4/rockets"), 2);
  }

  #[tokio::test]
  async fn spawned_sync_completes_after_handle_is_dropped() {
    let svc = service(upstream()).await;
    drop(svc.spawn_sync(Some(EntityKind::Rocket)));

    let handle = svc.spawn_sync(Some(EntityKind::Launchpad));
    let tallies = handle.await.unwrap().unwrap();
    assert_eq!(tallies[0].kind, EntityKind::Launchpad);

    for _ in 0..200 {
      if svc.store().find_rocket("r9").await.unwrap().is_some() {
        return;
      }
      tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("detached sync never finished");
  }

  #[tokio::test]
  async fn health_check_reports_unreachable_upstream() {
    let svc = service(FakeTransport::new()).await;
    assert!(!svc.upstream_health_check().await);
  }
}

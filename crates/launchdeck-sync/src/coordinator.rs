//! One sync run per entity kind.
//!
//! A run fetches the whole upstream collection, maps each item, and upserts
//! it by natural key. Items that cannot be mapped are skipped and counted.
//! A failed bulk fetch aborts the run before anything is written; a store
//! failure aborts it part-way, leaving earlier upserts committed. Records
//! that disappear upstream are left alone.

use launchdeck_core::{
  entity::EntityKind,
  launch::EntityRef,
  record::Upserted,
  store::RecordStore,
  tally::{ItemOutcome, SyncTally},
};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::{
  clock::Clock,
  config::SyncConfig,
  error::{Error, Result},
  mapper,
  names::NameResolutionCache,
  transport::Transport,
  upstream::UpstreamClient,
};

pub struct SyncCoordinator<'a, S, T, C> {
  store:  &'a S,
  client: &'a UpstreamClient<T, C>,
  config: &'a SyncConfig,
}

impl<'a, S, T, C> SyncCoordinator<'a, S, T, C>
where
  S: RecordStore,
  T: Transport,
  C: Clock,
{
  pub fn new(store: &'a S, client: &'a UpstreamClient<T, C>, config: &'a SyncConfig) -> Self {
    Self { store, client, config }
  }

  pub async fn sync(&self, kind: EntityKind) -> Result<SyncTally> {
    match kind {
      EntityKind::Launch => self.sync_launches().await,
      EntityKind::Rocket => self.sync_rockets().await,
      EntityKind::Launchpad => self.sync_launchpads().await,
    }
  }

  pub async fn sync_rockets(&self) -> Result<SyncTally> {
    let items = self.client.rockets().await?;
    let mut run = Run::start(EntityKind::Rocket, items.len(), self.config.batch_size);
    for raw in &items {
      let outcome = match mapper::map_rocket(raw) {
        Ok(record) => run.stored(self.store.upsert_rocket(record).await)?,
        Err(e) => ItemOutcome::Skipped { reason: e.to_string() },
      };
      run.record(raw, outcome);
    }
    Ok(run.finish())
  }

  pub async fn sync_launchpads(&self) -> Result<SyncTally> {
    let items = self.client.launchpads().await?;
    let mut run = Run::start(EntityKind::Launchpad, items.len(), self.config.batch_size);
    for raw in &items {
      let outcome = match mapper::map_launchpad(raw) {
        Ok(record) => run.stored(self.store.upsert_launchpad(record).await)?,
        Err(e) => ItemOutcome::Skipped { reason: e.to_string() },
      };
      run.record(raw, outcome);
    }
    Ok(run.finish())
  }

  /// Launches additionally get their rocket and launchpad names resolved
  /// upstream, once per distinct ID for the whole run.
  pub async fn sync_launches(&self) -> Result<SyncTally> {
    let items = self.client.launches().await?;
    let mut run = Run::start(EntityKind::Launch, items.len(), self.config.batch_size);
    let mut names = NameResolutionCache::new(self.client, self.config.delay());

    for raw in &items {
      let outcome = match mapper::map_launch(raw) {
        Ok(mut record) => {
          resolve(&mut names, EntityKind::Rocket, &mut record.rocket).await;
          resolve(&mut names, EntityKind::Launchpad, &mut record.launchpad).await;
          run.stored(self.store.upsert_launch(record).await)?
        }
        Err(e) => ItemOutcome::Skipped { reason: e.to_string() },
      };
      run.record(raw, outcome);
    }

    info!(requests = names.requests(), "launch references resolved");
    Ok(run.finish())
  }
}

async fn resolve<T: Transport, C: Clock>(
  names: &mut NameResolutionCache<'_, T, C>,
  kind: EntityKind,
  reference: &mut EntityRef,
) {
  if let Some(id) = &reference.id {
    reference.name = names.resolve(kind, id).await;
  }
}

// ─── Run bookkeeping ─────────────────────────────────────────────────────────

struct Run {
  tally:      SyncTally,
  batch_size: usize,
  processed:  usize,
}

impl Run {
  fn start(kind: EntityKind, total: usize, batch_size: usize) -> Self {
    info!(%kind, total, "sync started");
    Self { tally: SyncTally::new(kind, total), batch_size, processed: 0 }
  }

  fn stored<R, E>(&self, result: Result<Upserted<R>, E>) -> Result<ItemOutcome>
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    match result {
      Ok(u) if u.was_created => Ok(ItemOutcome::Created),
      Ok(_) => Ok(ItemOutcome::Updated),
      Err(e) => {
        error!(
          kind = %self.tally.kind,
          processed = self.processed,
          error = %e,
          "store write failed; aborting sync"
        );
        Err(Error::Store(Box::new(e)))
      }
    }
  }

  fn record(&mut self, raw: &Value, outcome: ItemOutcome) {
    if let ItemOutcome::Skipped { reason } = &outcome {
      warn!(
        kind = %self.tally.kind,
        index = self.processed,
        id = mapper::raw_id(raw),
        reason = %reason,
        "skipping malformed upstream item"
      );
    }
    self.tally.record(&outcome);
    self.processed += 1;

    if self.batch_size > 0 && self.processed % self.batch_size == 0 {
      info!(
        kind = %self.tally.kind,
        processed = self.processed,
        total = self.tally.total_from_upstream,
        "sync progress"
      );
    }
  }

  fn finish(self) -> SyncTally {
    let t = &self.tally;
    info!(
      kind = %t.kind,
      total = t.total_from_upstream,
      created = t.created,
      updated = t.updated,
      skipped = t.skipped,
      "sync finished"
    );
    self.tally
  }
}

//! Handlers for `/admin` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/admin/sync` | Rockets, launchpads, then launches |
//! | `POST` | `/admin/sync/{kind}` | `launches`, `rockets` or `launchpads` |
//! | `POST` | `/admin/clear-cache` | Drops every cached upstream response |
//! | `GET`  | `/admin/api-health` | Upstream reachability |
//! | `GET`  | `/admin/stats` | Launch stats plus upstream and cache status |
//!
//! Syncs run on their own task, so a client that disconnects mid-run does
//! not cancel it.

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use launchdeck_core::{
  entity::EntityKind, query::LaunchStats, store::RecordStore, tally::SyncTally,
};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiError};

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
  pub runs: Vec<SyncTally>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiHealth {
  pub api_healthy: bool,
  pub checked_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheCleared {
  pub cleared: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
  pub launches:         LaunchStats,
  pub api_status:       ApiHealth,
  pub cached_responses: usize,
}

async fn run_sync<S: RecordStore + 'static>(
  state: &AppState<S>,
  kind: Option<EntityKind>,
) -> Result<Json<SyncReport>, ApiError> {
  info!(kind = kind.map_or("all", |k| k.collection()), "sync requested");
  let runs = state
    .sync
    .spawn_sync(kind)
    .await
    .map_err(|e| ApiError::Internal(format!("sync task: {e}")))??;
  Ok(Json(SyncReport { runs }))
}

/// `POST /admin/sync`
pub async fn sync_all<S: RecordStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<SyncReport>, ApiError> {
  run_sync(&state, None).await
}

/// `POST /admin/sync/{kind}`
pub async fn sync_one<S: RecordStore + 'static>(
  State(state): State<AppState<S>>,
  Path(kind): Path<String>,
) -> Result<Json<SyncReport>, ApiError> {
  let kind = EntityKind::from_collection(&kind).map_err(|e| ApiError::BadRequest(e.to_string()))?;
  run_sync(&state, Some(kind)).await
}

/// `POST /admin/clear-cache`
pub async fn clear_cache<S: RecordStore + 'static>(
  State(state): State<AppState<S>>,
) -> Json<CacheCleared> {
  Json(CacheCleared { cleared: state.sync.clear_upstream_cache() })
}

/// `GET /admin/api-health`
pub async fn api_health<S: RecordStore + 'static>(
  State(state): State<AppState<S>>,
) -> Json<ApiHealth> {
  let api_healthy = state.sync.upstream_health_check().await;
  Json(ApiHealth { api_healthy, checked_at: Utc::now() })
}

/// `GET /admin/stats`
pub async fn stats<S: RecordStore + 'static>(
  State(state): State<AppState<S>>,
) -> Result<Json<AdminStats>, ApiError> {
  let now = Utc::now();
  let launches = state.store.launch_stats(now).await.map_err(ApiError::store)?;
  let api_healthy = state.sync.upstream_health_check().await;
  Ok(Json(AdminStats {
    launches,
    api_status: ApiHealth { api_healthy, checked_at: Utc::now() },
    cached_responses: state.sync.client().cache().len(),
  }))
}

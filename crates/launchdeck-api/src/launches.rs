//! Handlers for `/launches` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/launches` | Filters, sort and paging via [`LaunchQuery`] |
//! | `GET`  | `/launches/upcoming` | The next launch, or `null` |
//! | `GET`  | `/launches/stats` | [`LaunchStats`] |
//! | `GET`  | `/launches/by-year` | Completed launches per year |
//! | `GET`  | `/launches/available-years` | Years with dated launches, newest first |
//! | `GET`  | `/launches/{id}` | By upstream ID; 404 if not synced |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use launchdeck_core::{
  launch::{LaunchRecord, LaunchStatus},
  query::{LaunchQuery, LaunchStats, Page, YearStats},
  record::Stored,
  store::RecordStore,
};
use serde::Serialize;

use crate::error::ApiError;

// ─── Response shape ──────────────────────────────────────────────────────────

/// A stored launch plus the values derived from it at read time.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchView {
  #[serde(flatten)]
  pub launch:            Stored<LaunchRecord>,
  pub status:            LaunchStatus,
  pub days_until_launch: Option<i64>,
}

impl LaunchView {
  pub fn new(launch: Stored<LaunchRecord>, now: DateTime<Utc>) -> Self {
    Self {
      status: launch.record.status(),
      days_until_launch: launch.record.days_until_launch(now),
      launch,
    }
  }
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /launches[?year=&success=&upcoming=&rocket_id=&launchpad_id=&search=&page=&per_page=&sort_by=&direction=]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(query): Query<LaunchQuery>,
) -> Result<Json<Page<LaunchView>>, ApiError> {
  let page = store.list_launches(&query).await.map_err(ApiError::store)?;
  let now = Utc::now();
  Ok(Json(Page {
    items:     page.items.into_iter().map(|l| LaunchView::new(l, now)).collect(),
    total:     page.total,
    page:      page.page,
    per_page:  page.per_page,
    last_page: page.last_page,
  }))
}

/// `GET /launches/upcoming`
pub async fn upcoming<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Option<LaunchView>>, ApiError> {
  let now = Utc::now();
  let next = store.next_launch(now).await.map_err(ApiError::store)?;
  Ok(Json(next.map(|l| LaunchView::new(l, now))))
}

/// `GET /launches/stats`
pub async fn stats<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<LaunchStats>, ApiError> {
  Ok(Json(store.launch_stats(Utc::now()).await.map_err(ApiError::store)?))
}

/// `GET /launches/by-year`
pub async fn by_year<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<YearStats>>, ApiError> {
  Ok(Json(store.launches_by_year().await.map_err(ApiError::store)?))
}

/// `GET /launches/available-years`
pub async fn available_years<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<i32>>, ApiError> {
  Ok(Json(store.available_years().await.map_err(ApiError::store)?))
}

/// `GET /launches/{id}`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<LaunchView>, ApiError> {
  let launch = store
    .find_launch(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("launch {id} not found")))?;
  Ok(Json(LaunchView::new(launch, Utc::now())))
}

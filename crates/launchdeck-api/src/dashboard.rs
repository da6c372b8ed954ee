//! Dashboard aggregates: headline figures, chart series, the next launch
//! and the most recent completed ones, all computed from the local store.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use launchdeck_core::{
  query::{LaunchGrouping, LaunchStats, NameCount},
  store::RecordStore,
};
use serde::Serialize;

use crate::{error::ApiError, launches::LaunchView};

pub const RECENT_LAUNCHES: usize = 10;
pub const TOP_GROUPS: usize = 10;

// ─── Shapes ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
  pub kpis:            Kpis,
  pub charts:          Charts,
  pub next_launch:     Option<LaunchView>,
  pub recent_launches: Vec<LaunchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
  pub total_launches:    u64,
  pub success_rate:      f64,
  pub upcoming_launches: u64,
  pub next_launch:       Option<NextLaunch>,
}

/// Headline summary of the next launch.
#[derive(Debug, Clone, Serialize)]
pub struct NextLaunch {
  pub id:         String,
  pub name:       String,
  pub date_utc:   Option<DateTime<Utc>>,
  pub days_until: Option<i64>,
  pub rocket:     Option<String>,
  pub launchpad:  Option<String>,
}

impl From<&LaunchView> for NextLaunch {
  fn from(view: &LaunchView) -> Self {
    let l = &view.launch.record;
    Self {
      id:         l.external_id.clone(),
      name:       l.name.clone(),
      date_utc:   l.date_utc,
      days_until: view.days_until_launch,
      rocket:     l.rocket.name.clone(),
      launchpad:  l.launchpad.name.clone(),
    }
  }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Charts {
  pub launches_by_year:      YearlyOutcomes,
  pub success_rate_by_year:  Series<i32, f64>,
  pub launches_by_rocket:    Series<String, u64>,
  pub launches_by_launchpad: Series<String, u64>,
}

/// Successful and failed launch counts per year, aligned with `labels`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct YearlyOutcomes {
  pub labels:     Vec<i32>,
  pub successful: Vec<u64>,
  pub failed:     Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Series<L, V> {
  pub labels: Vec<L>,
  pub data:   Vec<V>,
}

impl<L, V> Default for Series<L, V> {
  fn default() -> Self { Self { labels: Vec::new(), data: Vec::new() } }
}

impl From<Vec<NameCount>> for Series<String, u64> {
  fn from(counts: Vec<NameCount>) -> Self {
    let (labels, data) = counts.into_iter().map(|c| (c.name, c.count)).unzip();
    Self { labels, data }
  }
}

// ─── Assembly ────────────────────────────────────────────────────────────────

async fn next_launch<S: RecordStore>(
  store: &S,
  now: DateTime<Utc>,
) -> Result<Option<LaunchView>, S::Error> {
  Ok(store.next_launch(now).await?.map(|l| LaunchView::new(l, now)))
}

fn kpis_from(stats: LaunchStats, next: Option<&LaunchView>) -> Kpis {
  Kpis {
    total_launches:    stats.total_launches,
    success_rate:      stats.success_rate,
    upcoming_launches: stats.upcoming_launches,
    next_launch:       next.map(NextLaunch::from),
  }
}

pub async fn kpis<S: RecordStore>(store: &S, now: DateTime<Utc>) -> Result<Kpis, S::Error> {
  let stats = store.launch_stats(now).await?;
  let next = next_launch(store, now).await?;
  Ok(kpis_from(stats, next.as_ref()))
}

pub async fn charts<S: RecordStore>(store: &S) -> Result<Charts, S::Error> {
  let by_year = store.launches_by_year().await?;

  let mut charts = Charts {
    launches_by_rocket: store.launch_counts_by(LaunchGrouping::Rocket, TOP_GROUPS).await?.into(),
    launches_by_launchpad: store
      .launch_counts_by(LaunchGrouping::Launchpad, TOP_GROUPS)
      .await?
      .into(),
    ..Charts::default()
  };
  for year in by_year {
    charts.launches_by_year.labels.push(year.year);
    charts.launches_by_year.successful.push(year.successful);
    charts.launches_by_year.failed.push(year.failed);
    charts.success_rate_by_year.labels.push(year.year);
    charts.success_rate_by_year.data.push(year.success_rate);
  }
  Ok(charts)
}

pub async fn dashboard<S: RecordStore>(store: &S, now: DateTime<Utc>) -> Result<Dashboard, S::Error> {
  let stats = store.launch_stats(now).await?;
  let next = next_launch(store, now).await?;
  let recent = store.recent_launches(RECENT_LAUNCHES).await?;

  Ok(Dashboard {
    kpis:            kpis_from(stats, next.as_ref()),
    charts:          charts(store).await?,
    next_launch:     next,
    recent_launches: recent.into_iter().map(|l| LaunchView::new(l, now)).collect(),
  })
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `GET /dashboard`
pub async fn index<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Dashboard>, ApiError> {
  Ok(Json(dashboard(store.as_ref(), Utc::now()).await.map_err(ApiError::store)?))
}

/// `GET /dashboard/kpis`
pub async fn kpis_handler<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Kpis>, ApiError> {
  Ok(Json(kpis(store.as_ref(), Utc::now()).await.map_err(ApiError::store)?))
}

/// `GET /dashboard/charts`
pub async fn charts_handler<S: RecordStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Charts>, ApiError> {
  Ok(Json(charts(store.as_ref()).await.map_err(ApiError::store)?))
}

//! Handlers for `/launchpads` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use launchdeck_core::{launchpad::LaunchpadRecord, record::Stored, store::RecordStore};
use serde::Serialize;

use crate::{error::ApiError, rockets::ListParams};

/// A stored launchpad with its success rate.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchpadView {
  #[serde(flatten)]
  pub launchpad:    Stored<LaunchpadRecord>,
  pub success_rate: f64,
}

impl From<Stored<LaunchpadRecord>> for LaunchpadView {
  fn from(launchpad: Stored<LaunchpadRecord>) -> Self {
    Self { success_rate: launchpad.record.success_rate(), launchpad }
  }
}

/// `GET /launchpads[?active=true]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<LaunchpadView>>, ApiError> {
  let pads = store.list_launchpads(params.active).await.map_err(ApiError::store)?;
  Ok(Json(pads.into_iter().map(LaunchpadView::from).collect()))
}

/// `GET /launchpads/{id}`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<LaunchpadView>, ApiError> {
  let pad = store
    .find_launchpad(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("launchpad {id} not found")))?;
  Ok(Json(pad.into()))
}

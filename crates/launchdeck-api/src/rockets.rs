//! Handlers for `/rockets` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use launchdeck_core::{record::Stored, rocket::RocketRecord, store::RecordStore};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  /// Only rockets upstream reports as active.
  #[serde(default)]
  pub active: bool,
}

/// `GET /rockets[?active=true]`
pub async fn list<S: RecordStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Stored<RocketRecord>>>, ApiError> {
  Ok(Json(store.list_rockets(params.active).await.map_err(ApiError::store)?))
}

/// `GET /rockets/{id}`
pub async fn get_one<S: RecordStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Stored<RocketRecord>>, ApiError> {
  let rocket = store
    .find_rocket(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("rocket {id} not found")))?;
  Ok(Json(rocket))
}

//! JSON REST API for launchdeck.
//!
//! Read endpoints are served from the local store only and never call
//! upstream. Admin endpoints drive a [`SyncService`]. Auth and TLS are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", launchdeck_api::api_router(AppState::new(sync)))
//! ```

pub mod admin;
pub mod dashboard;
pub mod error;
pub mod launches;
pub mod launchpads;
pub mod rockets;


use std::sync::Arc;

use axum::{
  Json, Router,
  extract::FromRef,
  routing::{get, post},
};
use chrono::Utc;
use launchdeck_core::store::RecordStore;
use launchdeck_sync::SyncService;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers. Read handlers only extract
/// the store.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub sync:  SyncService<S>,
}

impl<S: RecordStore> AppState<S> {
  pub fn new(sync: SyncService<S>) -> Self { Self { store: sync.store().clone(), sync } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone(), sync: self.sync.clone() } }
}

impl<S> FromRef<AppState<S>> for Arc<S> {
  fn from_ref(state: &AppState<S>) -> Self { state.store.clone() }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Launches
    .route("/launches", get(launches::list::<S>))
    .route("/launches/upcoming", get(launches::upcoming::<S>))
    .route("/launches/stats", get(launches::stats::<S>))
    .route("/launches/by-year", get(launches::by_year::<S>))
    .route("/launches/available-years", get(launches::available_years::<S>))
    .route("/launches/{id}", get(launches::get_one::<S>))
    // Rockets and launchpads
    .route("/rockets", get(rockets::list::<S>))
    .route("/rockets/{id}", get(rockets::get_one::<S>))
    .route("/launchpads", get(launchpads::list::<S>))
    .route("/launchpads/{id}", get(launchpads::get_one::<S>))
    // Dashboard
    .route("/dashboard", get(dashboard::index::<S>))
    .route("/dashboard/kpis", get(dashboard::kpis_handler::<S>))
    .route("/dashboard/charts", get(dashboard::charts_handler::<S>))
    // Admin
    .route("/admin/sync", post(admin::sync_all::<S>))
    .route("/admin/sync/{kind}", post(admin::sync_one::<S>))
    .route("/admin/clear-cache", post(admin::clear_cache::<S>))
    .route("/admin/api-health", get(admin::api_health::<S>))
    .route("/admin/stats", get(admin::stats::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// `GET /health`
async fn health() -> Json<Value> {
  Json(json!({ "status": "ok", "timestamp": Utc::now() }))
}

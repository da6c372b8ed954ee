//! `HttpTransport` and `UpstreamClient` against a local axum server.

use std::time::Duration;

use axum::{Json, Router, http::StatusCode, routing::get};
use launchdeck_core::entity::EntityKind;
use launchdeck_sync::{
  Error, UpstreamClient, UpstreamConfig,
  transport::{HttpTransport, Request, Transport},
};
use serde_json::json;

async fn serve(router: Router) -> String {
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, router).await.unwrap();
  });
  format!("http://{addr}")
}

fn upstream() -> Router {
  Router::new()
    .route(
      "/v4/rockets",
      get(|| async { Json(json!([{"id": "5e9d0d95eda69973a809d1ec", "name": "Falcon 9"}])) }),
    )
    .route("/v4/company", get(|| async { Json(json!({"name": "SpaceX"})) }))
    .route("/v5/launches", get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }))
    .route("/v4/launchpads", get(|| async { "not json" }))
    .route(
      "/v4/rockets/slow",
      get(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Json(json!({}))
      }),
    )
}

fn config(base: &str) -> UpstreamConfig {
  UpstreamConfig { api_base_url: format!("{base}/"), timeout: 1, ..Default::default() }
}

#[tokio::test]
async fn transport_returns_status_and_body() {
  let base = serve(upstream()).await;
  let transport = HttpTransport::new(&base).unwrap();

  let ok = transport
    .get(&Request { path: "/v4/rockets".into(), query: vec![], timeout: Duration::from_secs(5) })
    .await
    .unwrap();
  assert_eq!(ok.status, 200);
  assert!(ok.body.contains("Falcon 9"));

  let down = transport
    .get(&Request { path: "/v5/launches".into(), query: vec![], timeout: Duration::from_secs(5) })
    .await
    .unwrap();
  assert_eq!(down.status, 503);
  assert_eq!(down.body, "maintenance");
}

#[tokio::test]
async fn client_classifies_upstream_failures() {
  let base = serve(upstream()).await;
  let client = UpstreamClient::from_config(&config(&base)).unwrap();

  let rockets = client.rockets().await.unwrap();
  assert_eq!(rockets[0]["name"], "Falcon 9");

  match client.launches().await {
    Err(Error::UpstreamError { status, body }) => {
      assert_eq!(status, 503);
      assert_eq!(body, "maintenance");
    }
    other => panic!("expected UpstreamError, got {other:?}"),
  }

  assert!(matches!(client.launchpads().await, Err(Error::UpstreamMalformed(_))));
  assert!(matches!(
    client.fetch_item(EntityKind::Rocket, "slow").await,
    Err(Error::UpstreamUnavailable(_))
  ));
}

#[tokio::test]
async fn health_check_against_live_and_dead_upstream() {
  let base = serve(upstream()).await;
  let live = UpstreamClient::from_config(&config(&base)).unwrap();
  assert!(live.health_check().await);

  // Nothing listens on port 9 of the loopback interface.
  let dead = UpstreamClient::from_config(&config("http://127.0.0.1:9")).unwrap();
  assert!(!dead.health_check().await);
}

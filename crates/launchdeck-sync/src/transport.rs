//! The raw HTTP seam under [`UpstreamClient`](crate::UpstreamClient).
//!
//! [`HttpTransport`] is the reqwest-backed implementation. Tests substitute
//! their own.

use std::{future::Future, time::Duration};

use tracing::debug;

use crate::error::{Error, Result};

/// One GET against the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
  /// Absolute path, e.g. `/v4/rockets`.
  pub path:    String,
  pub query:   Vec<(String, String)>,
  pub timeout: Duration,
}

/// Status and body of an upstream answer, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
  pub status: u16,
  pub body:   String,
}

impl RawResponse {
  pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }
}

pub trait Transport: Send + Sync {
  /// Perform the request. Fails with [`Error::UpstreamUnavailable`] only
  /// when no response was received; any status code is a success here.
  fn get<'a>(&'a self, request: &'a Request)
  -> impl Future<Output = Result<RawResponse>> + Send + 'a;
}

// ─── reqwest ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HttpTransport {
  client:   reqwest::Client,
  base_url: String,
}

impl HttpTransport {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(concat!("launchdeck/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| Error::UpstreamUnavailable(format!("building HTTP client: {e}")))?;
    let base_url = base_url.into().trim_end_matches('/').to_owned();
    Ok(Self { client, base_url })
  }
}

impl Transport for HttpTransport {
  async fn get(&self, request: &Request) -> Result<RawResponse> {
    let url = format!("{}{}", self.base_url, request.path);
    debug!(%url, timeout_secs = request.timeout.as_secs(), "GET");

    let resp = self
      .client
      .get(&url)
      .query(&request.query)
      .timeout(request.timeout)
      .send()
      .await
      .map_err(|e| Error::UpstreamUnavailable(format!("GET {url}: {e}")))?;

    let status = resp.status().as_u16();
    let body = resp
      .text()
      .await
      .map_err(|e| Error::UpstreamUnavailable(format!("reading body of {url}: {e}")))?;

    Ok(RawResponse { status, body })
  }
}

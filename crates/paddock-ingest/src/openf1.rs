//! [`OpenF1Source`] — a [`TelemetrySource`] over the OpenF1 REST API.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  source::{ApiDriver, ApiLap, ApiPosition, ApiSession, TelemetrySource},
};

/// Default OpenF1 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openf1.org/v1";

/// Provider connection settings, deserialised from the server config.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// Per-request timeout. A hung upstream stalls only its own scope.
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

fn default_timeout_secs() -> u64 { 30 }

impl Default for ProviderConfig {
  fn default() -> Self {
    Self { base_url: default_base_url(), timeout_secs: default_timeout_secs() }
  }
}

/// Async HTTP client for the OpenF1 API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct OpenF1Source {
  client:   Client,
  base_url: String,
}

impl OpenF1Source {
  pub fn new(config: &ProviderConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .user_agent(concat!("paddock/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_owned() })
  }

  fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

  /// `GET` a JSON array. OpenF1 answers 404 when a filter matches nothing,
  /// which is an empty result rather than a failure.
  async fn fetch<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<Vec<T>> {
    let url = self.url(path);
    tracing::debug!(%url, ?query, "fetching");

    let resp = self
      .client
      .get(&url)
      .query(query)
      .send()
      .await
      .map_err(|source| Error::Http { url: url.clone(), source })?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
      return Ok(Vec::new());
    }
    if !status.is_success() {
      return Err(Error::Status { url, status: status.as_u16() });
    }

    let body = resp
      .bytes()
      .await
      .map_err(|source| Error::Http { url: url.clone(), source })?;
    serde_json::from_slice(&body).map_err(|source| Error::Decode { url, source })
  }
}

impl TelemetrySource for OpenF1Source {
  /// `GET /drivers?session_key=<key>`
  async fn drivers(&self, session_key: u32) -> Result<Vec<ApiDriver>> {
    self.fetch("/drivers", &[("session_key", session_key.to_string())]).await
  }

  /// `GET /sessions?session_name=Race&year=<year>`
  async fn race_sessions(&self, year: i32) -> Result<Vec<ApiSession>> {
    self
      .fetch("/sessions", &[("session_name", "Race".to_owned()), ("year", year.to_string())])
      .await
  }

  /// `GET /position?session_key=<key>`
  async fn positions(&self, session_key: u32) -> Result<Vec<ApiPosition>> {
    self.fetch("/position", &[("session_key", session_key.to_string())]).await
  }

  /// `GET /laps?session_key=<key>`
  async fn laps(&self, session_key: u32) -> Result<Vec<ApiLap>> {
    self.fetch("/laps", &[("session_key", session_key.to_string())]).await
  }
}

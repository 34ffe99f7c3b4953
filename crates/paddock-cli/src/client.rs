//! Async HTTP client wrapping the paddock JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use paddock_core::{
  driver::Driver,
  stats::{DriverDetail, RaceDetail, RaceSummary, SeasonSummary},
};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Async HTTP client for the paddock JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  pub fn base_url(&self) -> &str { &self.base_url }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let resp = self
      .client
      .get(self.url(path))
      .send()
      .await
      .with_context(|| format!("GET {path} failed"))?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET {path} → {}", resp.status()));
    }
    resp.json().await.with_context(|| format!("deserialising {path}"))
  }

  /// `GET /api/corredor`
  pub async fn list_drivers(&self) -> Result<Vec<Driver>> { self.get("/corredor").await }

  /// `GET /api/corredor/detalle/<number>`
  pub async fn driver_detail(&self, driver_number: u32) -> Result<DriverDetail> {
    self.get(&format!("/corredor/detalle/{driver_number}")).await
  }

  /// `GET /api/carrera`
  pub async fn list_races(&self) -> Result<Vec<RaceSummary>> { self.get("/carrera").await }

  /// `GET /api/carrera/detalle/<session_key>`
  pub async fn race_detail(&self, session_key: u32) -> Result<RaceDetail> {
    self.get(&format!("/carrera/detalle/{session_key}")).await
  }

  /// `GET /api/temporada/resumen`
  pub async fn season_summary(&self) -> Result<SeasonSummary> {
    self.get("/temporada/resumen").await
  }
}

//! Paddock server: configuration and HTTP application assembly.
//!
//! The binary in `main.rs` loads a [`ServerConfig`], runs one ingestion pass
//! and then serves [`app`].

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use paddock_core::{stats::Stats, store::SeasonStore};
use paddock_ingest::{IngestPlan, IngestScope, ProviderConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PADDOCK_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default = "default_season")]
  pub season:     i32,
  #[serde(default)]
  pub provider:   ProviderConfig,
  /// Sessions whose rosters are imported, each with its driver allow-list.
  #[serde(default)]
  pub scopes:     Vec<IngestScope>,
}

fn default_host() -> String { "0.0.0.0".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("paddock.db") }

fn default_season() -> i32 { 2024 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
      season:     default_season(),
      provider:   ProviderConfig::default(),
      scopes:     Vec::new(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// The ingestion plan described by this configuration.
  pub fn plan(&self) -> IngestPlan {
    IngestPlan { season: self.season, scopes: self.scopes.clone() }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: the JSON API under `/api`, every request
/// traced.
pub fn app<S>(stats: Arc<Stats<S>>) -> Router
where
  S: SeasonStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", paddock_api::api_router(stats))
    .layer(TraceLayer::new_for_http())
}

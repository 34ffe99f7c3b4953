//! paddock-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store, imports the configured season from OpenF1 and serves the
//! JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use paddock_core::{stats::Stats, store::SeasonStore};
use paddock_ingest::{Loader, OpenF1Source};
use paddock_server::ServerConfig;
use paddock_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Paddock race statistics server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Serve whatever is already in the store without contacting the provider.
  #[arg(long)]
  skip_ingest: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("PADDOCK")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = Arc::new(
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?,
  );

  if cli.skip_ingest {
    tracing::info!("ingestion skipped");
  } else {
    let source = OpenF1Source::new(&server_cfg.provider)
      .context("failed to build provider client")?;
    let report = Loader::new(store.clone(), source, server_cfg.plan()).run().await;
    if report.failed_scopes() > 0 {
      tracing::warn!(failed_scopes = report.failed_scopes(), "ingestion incomplete");
    }
  }

  match store.counts().await {
    Ok(counts) => tracing::info!(?counts, "store ready"),
    Err(e) => tracing::warn!(error = %e, "cannot count stored rows"),
  }

  let stats = Arc::new(Stats::new(store, server_cfg.season));
  let app = paddock_server::app(stats);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

//! Error type for `paddock-ingest`.

use thiserror::Error;

/// A failure to obtain one scope's data from the provider.
#[derive(Debug, Error)]
pub enum Error {
  #[error("request to {url} failed: {source}")]
  Http {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Status { url: String, status: u16 },

  #[error("malformed payload from {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error types for `paddock-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Classification positions start at 1.
  #[error("invalid position {position} for driver {driver_number} in session {session_key}")]
  InvalidPosition {
    driver_number: u32,
    session_key:   u32,
    position:      i64,
  },

  #[error("invalid identifier: {0:?}")]
  InvalidId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Per-driver timing records: classification positions and laps.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A driver's classification in a session. At most one per
/// `(driver_number, session_key)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub driver_number: u32,
  pub session_key:   u32,
  pub position:      u32,
  pub date:          String,
}

impl Position {
  /// Build a position, rejecting values below 1.
  pub fn new(
    driver_number: u32,
    session_key: u32,
    position: i64,
    date: String,
  ) -> Result<Self> {
    let position = u32::try_from(position)
      .ok()
      .filter(|p| *p > 0)
      .ok_or(Error::InvalidPosition { driver_number, session_key, position })?;
    Ok(Self { driver_number, session_key, position, date })
  }
}

/// One lap by one driver. Keyed by `(driver_number, session_key, lap_number)`.
///
/// Timing fields are optional: out-laps and aborted laps carry no duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lap {
  pub driver_number:     u32,
  pub session_key:       u32,
  pub lap_number:        u32,
  pub lap_duration:      Option<f64>,
  pub duration_sector_1: Option<f64>,
  pub duration_sector_2: Option<f64>,
  pub duration_sector_3: Option<f64>,
  /// Speed-trap reading in km/h.
  pub st_speed:          Option<f64>,
  pub date_start:        String,
}

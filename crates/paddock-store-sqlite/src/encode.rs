//! Decoding helpers between SQLite rows and the domain types of
//! `paddock-core`.
//!
//! Integer columns are read as `i64` and narrowed here so an out-of-range
//! value surfaces as an [`Error::OutOfRange`] rather than a panic. Empty text
//! columns stand for values the provider did not report.

use paddock_core::{
  driver::{Driver, full_name},
  session::Session,
  store::{ClassifiedEntry, DriverCount, DriverRaceRow, FastestLap, TopSpeed},
};

use crate::{Error, Result};

// ─── Integers ─────────────────────────────────────────────────────────────────

pub fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

pub fn decode_i32(column: &'static str, value: i64) -> Result<i32> {
  i32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

/// Positions are stored under a `CHECK (position > 0)`; anything else is a
/// corrupt row.
pub fn decode_position(driver_number: u32, session_key: u32, value: i64) -> Result<u32> {
  match u32::try_from(value) {
    Ok(p) if p > 0 => Ok(p),
    _ => Err(
      paddock_core::Error::InvalidPosition { driver_number, session_key, position: value }
        .into(),
    ),
  }
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

pub struct RawDriver {
  pub driver_number: i64,
  pub first_name:    String,
  pub last_name:     String,
  pub name_acronym:  String,
  pub team_name:     String,
  pub country_code:  String,
}

impl RawDriver {
  pub const COLUMNS: &'static str =
    "driver_number, first_name, last_name, name_acronym, team_name, country_code";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      driver_number: row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      name_acronym:  row.get(3)?,
      team_name:     row.get(4)?,
      country_code:  row.get(5)?,
    })
  }

  pub fn into_driver(self) -> Result<Driver> {
    Ok(Driver {
      driver_number: decode_u32("driver_number", self.driver_number)?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      name_acronym:  self.name_acronym,
      team_name:     self.team_name,
      country_code:  self.country_code,
    })
  }
}

pub struct RawSession {
  pub session_key:        i64,
  pub session_name:       String,
  pub session_type:       String,
  pub location:           String,
  pub country_name:       String,
  pub year:               i64,
  pub circuit_short_name: String,
  pub date_start:         String,
}

impl RawSession {
  pub const COLUMNS: &'static str = "session_key, session_name, session_type, location, \
                                     country_name, year, circuit_short_name, date_start";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      session_key:        row.get(0)?,
      session_name:       row.get(1)?,
      session_type:       row.get(2)?,
      location:           row.get(3)?,
      country_name:       row.get(4)?,
      year:               row.get(5)?,
      circuit_short_name: row.get(6)?,
      date_start:         row.get(7)?,
    })
  }

  pub fn into_session(self) -> Result<Session> {
    Ok(Session {
      session_key:        decode_u32("session_key", self.session_key)?,
      session_name:       self.session_name,
      session_type:       self.session_type,
      location:           self.location,
      country_name:       self.country_name,
      year:               decode_i32("year", self.year)?,
      circuit_short_name: self.circuit_short_name,
      date_start:         self.date_start,
    })
  }
}

pub struct RawDriverRaceRow {
  pub session_key:        i64,
  pub circuit_short_name: String,
  pub session_name:       String,
  pub position:           i64,
  pub max_speed:          Option<f64>,
  pub best_lap_duration:  Option<f64>,
  pub session_fastest:    Option<f64>,
}

impl RawDriverRaceRow {
  pub fn into_row(self, driver_number: u32) -> Result<DriverRaceRow> {
    let session_key = decode_u32("session_key", self.session_key)?;
    Ok(DriverRaceRow {
      session_key,
      circuit_short_name: self.circuit_short_name,
      session_name: self.session_name,
      position: decode_position(driver_number, session_key, self.position)?,
      best_lap_duration: self.best_lap_duration,
      max_speed: self.max_speed,
      session_fastest: self.session_fastest,
    })
  }
}

pub struct RawClassifiedEntry {
  pub position:      i64,
  pub driver_number: i64,
  pub first_name:    String,
  pub last_name:     String,
  pub team_name:     String,
  pub country_code:  String,
}

impl RawClassifiedEntry {
  pub fn into_entry(self, session_key: u32) -> Result<ClassifiedEntry> {
    let driver_number = decode_u32("driver_number", self.driver_number)?;
    Ok(ClassifiedEntry {
      position: decode_position(driver_number, session_key, self.position)?,
      driver_number,
      driver: full_name(&self.first_name, &self.last_name),
      team: self.team_name,
      country: self.country_code,
    })
  }
}

pub struct RawFastestLap {
  pub driver_number: i64,
  pub first_name:    String,
  pub last_name:     String,
  pub lap_number:    i64,
  pub lap_duration:  f64,
  pub sector_1:      Option<f64>,
  pub sector_2:      Option<f64>,
  pub sector_3:      Option<f64>,
}

impl RawFastestLap {
  pub fn into_fastest_lap(self) -> Result<FastestLap> {
    Ok(FastestLap {
      driver_number: decode_u32("driver_number", self.driver_number)?,
      driver:        full_name(&self.first_name, &self.last_name),
      lap_number:    decode_u32("lap_number", self.lap_number)?,
      total_time:    self.lap_duration,
      sector_1:      self.sector_1,
      sector_2:      self.sector_2,
      sector_3:      self.sector_3,
    })
  }
}

pub struct RawTopSpeed {
  pub driver_number: i64,
  pub first_name:    String,
  pub last_name:     String,
  pub st_speed:      f64,
}

impl RawTopSpeed {
  pub fn into_top_speed(self) -> Result<TopSpeed> {
    Ok(TopSpeed {
      driver_number: decode_u32("driver_number", self.driver_number)?,
      driver:        full_name(&self.first_name, &self.last_name),
      speed_kmh:     self.st_speed,
    })
  }
}

pub struct RawDriverCount {
  pub driver_number: i64,
  pub first_name:    String,
  pub last_name:     String,
  pub count:         i64,
}

impl RawDriverCount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      driver_number: row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      count:         row.get(3)?,
    })
  }

  pub fn into_count(self) -> Result<DriverCount> {
    Ok(DriverCount {
      driver_number: decode_u32("driver_number", self.driver_number)?,
      driver:        full_name(&self.first_name, &self.last_name),
      count:         decode_u32("count", self.count)?,
    })
  }
}

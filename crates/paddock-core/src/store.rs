//! The `SeasonStore` trait and the row types its queries return.
//!
//! The trait is implemented by storage backends (e.g. `paddock-store-sqlite`).
//! The ingestion loader writes through it and the aggregation engine reads
//! through it; neither depends on a concrete backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{driver::Driver, session::Session, timing::{Lap, Position}};

// ─── Write outcomes ──────────────────────────────────────────────────────────

/// Result of a batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOutcome {
  /// Rows written.
  pub inserted: usize,
  /// Rows whose key was already present (no-op).
  pub ignored:  usize,
  /// Rows refused by a constraint (foreign key, check).
  pub rejected: usize,
}

impl BatchOutcome {
  pub fn total(&self) -> usize { self.inserted + self.ignored + self.rejected }
}

impl std::ops::AddAssign for BatchOutcome {
  fn add_assign(&mut self, rhs: Self) {
    self.inserted += rhs.inserted;
    self.ignored += rhs.ignored;
    self.rejected += rhs.rejected;
  }
}

/// Row counts per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCounts {
  pub drivers:   u64,
  pub sessions:  u64,
  pub positions: u64,
  pub laps:      u64,
}

// ─── Query rows ──────────────────────────────────────────────────────────────

/// One session a driver is classified in, with that driver's lap aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRaceRow {
  pub session_key:        u32,
  pub circuit_short_name: String,
  pub session_name:       String,
  pub position:           u32,
  /// The driver's minimum lap duration in the session.
  pub best_lap_duration:  Option<f64>,
  /// The driver's maximum speed-trap reading in the session.
  pub max_speed:          Option<f64>,
  /// The session's minimum lap duration over all drivers.
  pub session_fastest:    Option<f64>,
}

/// A classified driver in a session, joined to the driver record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedEntry {
  pub position:      u32,
  pub driver_number: u32,
  pub driver:        String,
  pub team:          String,
  pub country:       String,
}

/// The quickest lap of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
  pub driver_number: u32,
  pub driver:        String,
  pub lap_number:    u32,
  pub total_time:    f64,
  pub sector_1:      Option<f64>,
  pub sector_2:      Option<f64>,
  pub sector_3:      Option<f64>,
}

/// The highest speed-trap reading of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSpeed {
  pub driver_number: u32,
  pub driver:        String,
  pub speed_kmh:     f64,
}

/// A per-driver tally used by the season rankings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverCount {
  pub driver_number: u32,
  pub driver:        String,
  pub count:         u32,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a season store backend.
///
/// Writes are insert-if-absent: an existing key is never overwritten or
/// duplicated, which makes ingestion safe to re-run. There are no update or
/// delete operations.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SeasonStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert a driver unless its number is already stored. Returns `true`
  /// when a row was written.
  fn insert_driver(
    &self,
    driver: Driver,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a session unless its key is already stored.
  fn insert_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a batch of positions in one transaction. Rows refused by a
  /// constraint are counted in [`BatchOutcome::rejected`] and do not abort
  /// the batch.
  fn insert_positions(
    &self,
    positions: Vec<Position>,
  ) -> impl Future<Output = Result<BatchOutcome, Self::Error>> + Send + '_;

  /// Insert a batch of laps in one transaction, with the same rejection
  /// semantics as [`insert_positions`](Self::insert_positions).
  fn insert_laps(
    &self,
    laps: Vec<Lap>,
  ) -> impl Future<Output = Result<BatchOutcome, Self::Error>> + Send + '_;

  // ── Drivers ───────────────────────────────────────────────────────────

  /// All drivers ordered by driver number.
  fn list_drivers(&self) -> impl Future<Output = Result<Vec<Driver>, Self::Error>> + Send + '_;

  /// Retrieve a driver by number. Returns `None` if not found.
  fn get_driver(
    &self,
    driver_number: u32,
  ) -> impl Future<Output = Result<Option<Driver>, Self::Error>> + Send + '_;

  /// Numbers of all stored drivers, ascending.
  fn driver_numbers(&self) -> impl Future<Output = Result<Vec<u32>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Keys of all stored sessions, ascending.
  fn session_keys(&self) -> impl Future<Output = Result<Vec<u32>, Self::Error>> + Send + '_;

  /// Retrieve a session by key. Returns `None` if not found.
  fn get_session(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Option<Session>, Self::Error>> + Send + '_;

  /// Race sessions ordered by start date.
  fn list_races(&self) -> impl Future<Output = Result<Vec<Session>, Self::Error>> + Send + '_;

  // ── Aggregation reads ─────────────────────────────────────────────────

  /// Every session the driver holds a position in, with lap aggregates,
  /// ordered by session start.
  fn driver_race_rows(
    &self,
    driver_number: u32,
  ) -> impl Future<Output = Result<Vec<DriverRaceRow>, Self::Error>> + Send + '_;

  /// Classified drivers of a session by ascending position.
  fn session_classification(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Vec<ClassifiedEntry>, Self::Error>> + Send + '_;

  /// The lap with the minimum duration in a session. Ties go to the lower
  /// lap number, then the lower driver number.
  fn fastest_lap(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Option<FastestLap>, Self::Error>> + Send + '_;

  /// The maximum speed-trap reading in a session. Ties go to the lower
  /// driver number.
  fn top_speed(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Option<TopSpeed>, Self::Error>> + Send + '_;

  /// Per driver, the number of sessions classified first.
  fn win_counts(&self) -> impl Future<Output = Result<Vec<DriverCount>, Self::Error>> + Send + '_;

  /// Per driver, the number of sessions in which they set the minimum lap
  /// duration.
  fn fastest_lap_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<DriverCount>, Self::Error>> + Send + '_;

  /// Per driver, the number of pole positions.
  ///
  /// No qualifying data is imported, so this counts sessions classified
  /// first, the same tally as [`win_counts`](Self::win_counts).
  fn pole_counts(&self) -> impl Future<Output = Result<Vec<DriverCount>, Self::Error>> + Send + '_;

  /// Row counts per table.
  fn counts(&self) -> impl Future<Output = Result<TableCounts, Self::Error>> + Send + '_;
}

//! [`SqliteStore`] — the SQLite implementation of [`SeasonStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use paddock_core::{
  driver::Driver,
  session::{RACE_SESSION_TYPE, Session},
  store::{
    BatchOutcome, ClassifiedEntry, DriverCount, DriverRaceRow, FastestLap, SeasonStore,
    TableCounts, TopSpeed,
  },
  timing::{Lap, Position},
};

use crate::{
  Result,
  encode::{
    RawClassifiedEntry, RawDriver, RawDriverCount, RawDriverRaceRow, RawFastestLap,
    RawSession, RawTopSpeed, decode_u32,
  },
  schema::SCHEMA,
};

// ─── SQL ──────────────────────────────────────────────────────────────────────

const INSERT_POSITION: &str = "
  INSERT INTO positions (driver_number, session_key, position, date)
  VALUES (?1, ?2, ?3, ?4)
  ON CONFLICT (driver_number, session_key) DO NOTHING";

const INSERT_LAP: &str = "
  INSERT INTO laps (
    driver_number, session_key, lap_number, lap_duration,
    duration_sector_1, duration_sector_2, duration_sector_3,
    st_speed, date_start
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
  ON CONFLICT (driver_number, session_key, lap_number) DO NOTHING";

const WIN_COUNTS: &str = "
  SELECT d.driver_number, d.first_name, d.last_name, COUNT(*)
  FROM positions p
  JOIN drivers d ON d.driver_number = p.driver_number
  WHERE p.position = 1
  GROUP BY d.driver_number";

const FASTEST_LAP_COUNTS: &str = "
  SELECT d.driver_number, d.first_name, d.last_name, COUNT(DISTINCT l.session_key)
  FROM laps l
  JOIN drivers d ON d.driver_number = l.driver_number
  WHERE l.lap_duration = (
    SELECT MIN(l2.lap_duration) FROM laps l2 WHERE l2.session_key = l.session_key
  )
  GROUP BY d.driver_number";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Paddock season store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a single-column integer query and narrow every value to `u32`.
  async fn query_keys(&self, sql: &'static str, column: &'static str) -> Result<Vec<u32>> {
    let raws: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|v| decode_u32(column, v)).collect()
  }

  async fn query_counts(&self, sql: &'static str) -> Result<Vec<DriverCount>> {
    let raws: Vec<RawDriverCount> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map([], RawDriverCount::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDriverCount::into_count).collect()
  }
}

/// Record the result of one insert in `outcome`. Constraint violations are
/// counted; any other failure aborts the batch.
fn tally(
  outcome: &mut BatchOutcome,
  result: rusqlite::Result<usize>,
  table: &'static str,
) -> rusqlite::Result<()> {
  match result {
    Ok(0) => outcome.ignored += 1,
    Ok(_) => outcome.inserted += 1,
    Err(rusqlite::Error::SqliteFailure(err, msg))
      if err.code == rusqlite::ErrorCode::ConstraintViolation =>
    {
      tracing::warn!(table, error = msg.as_deref().unwrap_or("constraint"), "row rejected");
      outcome.rejected += 1;
    }
    Err(e) => return Err(e),
  }
  Ok(())
}

// ─── SeasonStore impl ────────────────────────────────────────────────────────

impl SeasonStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn insert_driver(&self, driver: Driver) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO drivers (
             driver_number, first_name, last_name, name_acronym, team_name, country_code
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (driver_number) DO NOTHING",
          rusqlite::params![
            driver.driver_number,
            driver.first_name,
            driver.last_name,
            driver.name_acronym,
            driver.team_name,
            driver.country_code,
          ],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn insert_session(&self, session: Session) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO sessions (
             session_key, session_name, session_type, location,
             country_name, year, circuit_short_name, date_start
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (session_key) DO NOTHING",
          rusqlite::params![
            session.session_key,
            session.session_name,
            session.session_type,
            session.location,
            session.country_name,
            session.year,
            session.circuit_short_name,
            session.date_start,
          ],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn insert_positions(&self, positions: Vec<Position>) -> Result<BatchOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();
        {
          let mut stmt = tx.prepare(INSERT_POSITION)?;
          for p in &positions {
            let result = stmt.execute(rusqlite::params![
              p.driver_number,
              p.session_key,
              p.position,
              p.date,
            ]);
            tally(&mut outcome, result, "positions")?;
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }

  async fn insert_laps(&self, laps: Vec<Lap>) -> Result<BatchOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut outcome = BatchOutcome::default();
        {
          let mut stmt = tx.prepare(INSERT_LAP)?;
          for l in &laps {
            let result = stmt.execute(rusqlite::params![
              l.driver_number,
              l.session_key,
              l.lap_number,
              l.lap_duration,
              l.duration_sector_1,
              l.duration_sector_2,
              l.duration_sector_3,
              l.st_speed,
              l.date_start,
            ]);
            tally(&mut outcome, result, "laps")?;
          }
        }
        tx.commit()?;
        Ok(outcome)
      })
      .await?;
    Ok(outcome)
  }

  // ── Drivers ───────────────────────────────────────────────────────────────

  async fn list_drivers(&self) -> Result<Vec<Driver>> {
    let raws: Vec<RawDriver> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM drivers ORDER BY driver_number",
          RawDriver::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawDriver::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDriver::into_driver).collect()
  }

  async fn get_driver(&self, driver_number: u32) -> Result<Option<Driver>> {
    let raw: Option<RawDriver> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM drivers WHERE driver_number = ?1", RawDriver::COLUMNS),
            rusqlite::params![driver_number],
            RawDriver::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDriver::into_driver).transpose()
  }

  async fn driver_numbers(&self) -> Result<Vec<u32>> {
    self
      .query_keys("SELECT driver_number FROM drivers ORDER BY driver_number", "driver_number")
      .await
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn session_keys(&self) -> Result<Vec<u32>> {
    self
      .query_keys("SELECT session_key FROM sessions ORDER BY session_key", "session_key")
      .await
  }

  async fn get_session(&self, session_key: u32) -> Result<Option<Session>> {
    let raw: Option<RawSession> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {} FROM sessions WHERE session_key = ?1", RawSession::COLUMNS),
            rusqlite::params![session_key],
            RawSession::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSession::into_session).transpose()
  }

  async fn list_races(&self) -> Result<Vec<Session>> {
    let raws: Vec<RawSession> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM sessions WHERE session_type = ?1 ORDER BY date_start, session_key",
          RawSession::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![RACE_SESSION_TYPE], RawSession::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSession::into_session).collect()
  }

  // ── Aggregation reads ─────────────────────────────────────────────────────

  async fn driver_race_rows(&self, driver_number: u32) -> Result<Vec<DriverRaceRow>> {
    let raws: Vec<RawDriverRaceRow> = self
      .conn
      .call(move |conn| {
        // Sessions without laps still count as results; their lap
        // aggregates come back NULL.
        let mut stmt = conn.prepare(
          "WITH session_best AS (
             SELECT session_key, MIN(lap_duration) AS fastest
             FROM laps
             GROUP BY session_key
           )
           SELECT s.session_key, s.circuit_short_name, s.session_name, p.position,
                  MAX(l.st_speed), MIN(l.lap_duration), b.fastest
           FROM positions p
           JOIN sessions s           ON s.session_key = p.session_key
           LEFT JOIN laps l          ON l.session_key = p.session_key
                                    AND l.driver_number = p.driver_number
           LEFT JOIN session_best b  ON b.session_key = p.session_key
           WHERE p.driver_number = ?1
           GROUP BY s.session_key
           ORDER BY s.date_start, s.session_key",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![driver_number], |row| {
            Ok(RawDriverRaceRow {
              session_key:        row.get(0)?,
              circuit_short_name: row.get(1)?,
              session_name:       row.get(2)?,
              position:           row.get(3)?,
              max_speed:          row.get(4)?,
              best_lap_duration:  row.get(5)?,
              session_fastest:    row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_row(driver_number)).collect()
  }

  async fn session_classification(&self, session_key: u32) -> Result<Vec<ClassifiedEntry>> {
    let raws: Vec<RawClassifiedEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT p.position, p.driver_number,
                  d.first_name, d.last_name, d.team_name, d.country_code
           FROM positions p
           JOIN drivers d ON d.driver_number = p.driver_number
           WHERE p.session_key = ?1
           ORDER BY p.position ASC, p.driver_number ASC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![session_key], |row| {
            Ok(RawClassifiedEntry {
              position:      row.get(0)?,
              driver_number: row.get(1)?,
              first_name:    row.get(2)?,
              last_name:     row.get(3)?,
              team_name:     row.get(4)?,
              country_code:  row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_entry(session_key)).collect()
  }

  async fn fastest_lap(&self, session_key: u32) -> Result<Option<FastestLap>> {
    let raw: Option<RawFastestLap> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT l.driver_number, d.first_name, d.last_name, l.lap_number,
                    l.lap_duration, l.duration_sector_1, l.duration_sector_2,
                    l.duration_sector_3
             FROM laps l
             JOIN drivers d ON d.driver_number = l.driver_number
             WHERE l.session_key = ?1 AND l.lap_duration IS NOT NULL
             ORDER BY l.lap_duration ASC, l.lap_number ASC, l.driver_number ASC
             LIMIT 1",
            rusqlite::params![session_key],
            |row| {
              Ok(RawFastestLap {
                driver_number: row.get(0)?,
                first_name:    row.get(1)?,
                last_name:     row.get(2)?,
                lap_number:    row.get(3)?,
                lap_duration:  row.get(4)?,
                sector_1:      row.get(5)?,
                sector_2:      row.get(6)?,
                sector_3:      row.get(7)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawFastestLap::into_fastest_lap).transpose()
  }

  async fn top_speed(&self, session_key: u32) -> Result<Option<TopSpeed>> {
    let raw: Option<RawTopSpeed> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT l.driver_number, d.first_name, d.last_name, l.st_speed
             FROM laps l
             JOIN drivers d ON d.driver_number = l.driver_number
             WHERE l.session_key = ?1 AND l.st_speed IS NOT NULL
             ORDER BY l.st_speed DESC, l.driver_number ASC
             LIMIT 1",
            rusqlite::params![session_key],
            |row| {
              Ok(RawTopSpeed {
                driver_number: row.get(0)?,
                first_name:    row.get(1)?,
                last_name:     row.get(2)?,
                st_speed:      row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTopSpeed::into_top_speed).transpose()
  }

  async fn win_counts(&self) -> Result<Vec<DriverCount>> { self.query_counts(WIN_COUNTS).await }

  async fn fastest_lap_counts(&self) -> Result<Vec<DriverCount>> {
    self.query_counts(FASTEST_LAP_COUNTS).await
  }

  async fn pole_counts(&self) -> Result<Vec<DriverCount>> { self.query_counts(WIN_COUNTS).await }

  async fn counts(&self) -> Result<TableCounts> {
    let counts = self
      .conn
      .call(|conn| {
        let count = |table: &str| -> rusqlite::Result<i64> {
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        };
        Ok((count("drivers")?, count("sessions")?, count("positions")?, count("laps")?))
      })
      .await?;

    let (drivers, sessions, positions, laps) = counts;
    Ok(TableCounts {
      drivers:   drivers.unsigned_abs(),
      sessions:  sessions.unsigned_abs(),
      positions: positions.unsigned_abs(),
      laps:      laps.unsigned_abs(),
    })
  }
}

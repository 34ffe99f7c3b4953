//! SQL schema for the Paddock SQLite store.
//!
//! Executed at every connection startup; `PRAGMA user_version` records the
//! layout revision.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS drivers (
    driver_number INTEGER PRIMARY KEY,
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    name_acronym  TEXT NOT NULL DEFAULT '',
    team_name     TEXT NOT NULL DEFAULT '',
    country_code  TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS sessions (
    session_key        INTEGER PRIMARY KEY,
    session_name       TEXT NOT NULL DEFAULT '',
    session_type       TEXT NOT NULL DEFAULT '',   -- only 'Race' is listed as a race
    location           TEXT NOT NULL DEFAULT '',
    country_name       TEXT NOT NULL DEFAULT '',
    year               INTEGER NOT NULL,
    circuit_short_name TEXT NOT NULL DEFAULT '',
    date_start         TEXT NOT NULL DEFAULT ''    -- ISO 8601, as reported upstream
);

-- Rows below are insert-only: no UPDATE or DELETE is ever issued.
CREATE TABLE IF NOT EXISTS positions (
    driver_number INTEGER NOT NULL REFERENCES drivers(driver_number),
    session_key   INTEGER NOT NULL REFERENCES sessions(session_key),
    position      INTEGER NOT NULL CHECK (position > 0),
    date          TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (driver_number, session_key)
);

CREATE TABLE IF NOT EXISTS laps (
    driver_number     INTEGER NOT NULL REFERENCES drivers(driver_number),
    session_key       INTEGER NOT NULL REFERENCES sessions(session_key),
    lap_number        INTEGER NOT NULL,
    lap_duration      REAL,   -- NULL for out-laps
    duration_sector_1 REAL,
    duration_sector_2 REAL,
    duration_sector_3 REAL,
    st_speed          REAL,
    date_start        TEXT NOT NULL DEFAULT '',
    PRIMARY KEY (driver_number, session_key, lap_number)
);

CREATE INDEX IF NOT EXISTS sessions_type_idx     ON sessions(session_type);
CREATE INDEX IF NOT EXISTS positions_session_idx ON positions(session_key, position);
CREATE INDEX IF NOT EXISTS laps_session_idx      ON laps(session_key, lap_duration);

PRAGMA user_version = 1;
";

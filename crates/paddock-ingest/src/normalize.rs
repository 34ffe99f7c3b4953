//! Conversion of upstream payloads into store rows.
//!
//! Rows that cannot be stored safely (unknown driver, wrong session, missing
//! or non-positive position) are dropped here and counted, so the store only
//! ever sees rows that satisfy its foreign keys.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};
use paddock_core::{
  driver::Driver,
  session::Session,
  timing::{Lap, Position},
};

use crate::source::{ApiDriver, ApiLap, ApiPosition, ApiSession};

/// Rows kept for writing plus the number discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered<T> {
  pub rows:    Vec<T>,
  pub dropped: usize,
}

pub fn driver(raw: ApiDriver) -> Driver {
  Driver {
    driver_number: raw.driver_number,
    first_name:    raw.first_name.unwrap_or_default(),
    last_name:     raw.last_name.unwrap_or_default(),
    name_acronym:  raw.name_acronym.unwrap_or_default(),
    team_name:     raw.team_name.unwrap_or_default(),
    country_code:  raw.country_code.unwrap_or_default(),
  }
}

pub fn session(raw: ApiSession) -> Session {
  Session {
    session_key:        raw.session_key,
    session_name:       raw.session_name.unwrap_or_default(),
    session_type:       raw.session_type.unwrap_or_default(),
    location:           raw.location.unwrap_or_default(),
    country_name:       raw.country_name.unwrap_or_default(),
    year:               raw.year,
    circuit_short_name: raw.circuit_short_name.unwrap_or_default(),
    date_start:         raw.date_start.unwrap_or_default(),
  }
}

fn parse_date(raw: Option<&str>) -> Option<DateTime<FixedOffset>> {
  raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}

/// Reduce a position time series to one final classification per driver.
///
/// The provider reports every position change during the session; the
/// latest sample per driver (by `date`, then by payload order) is the final
/// standing. Samples without a parseable date sort before dated ones.
pub fn final_classification(
  samples: Vec<ApiPosition>,
  session_key: u32,
  known_drivers: &HashSet<u32>,
) -> Filtered<Position> {
  let total = samples.len();
  let mut latest: HashMap<u32, (Option<DateTime<FixedOffset>>, usize, ApiPosition)> =
    HashMap::new();

  for (index, sample) in samples.into_iter().enumerate() {
    if sample.session_key != session_key || !known_drivers.contains(&sample.driver_number) {
      continue;
    }
    if !sample.position.is_some_and(|p| p > 0) {
      continue;
    }
    let date = parse_date(sample.date.as_deref());
    let newer = match latest.get(&sample.driver_number) {
      Some((d, i, _)) => (date, index) > (*d, *i),
      None => true,
    };
    if newer {
      latest.insert(sample.driver_number, (date, index, sample));
    }
  }

  let mut rows: Vec<Position> = latest
    .into_values()
    .filter_map(|(_, _, s)| {
      let position = s.position?;
      Position::new(s.driver_number, s.session_key, position, s.date.unwrap_or_default()).ok()
    })
    .collect();
  rows.sort_by_key(|p| (p.position, p.driver_number));

  // Every discarded sample counts, including superseded intermediate ones.
  Filtered { dropped: total - rows.len(), rows }
}

/// Keep laps of known drivers in the expected session.
pub fn laps(raw: Vec<ApiLap>, session_key: u32, known_drivers: &HashSet<u32>) -> Filtered<Lap> {
  let total = raw.len();
  let rows: Vec<Lap> = raw
    .into_iter()
    .filter(|l| l.session_key == session_key && known_drivers.contains(&l.driver_number))
    .map(|l| Lap {
      driver_number:     l.driver_number,
      session_key:       l.session_key,
      lap_number:        l.lap_number,
      lap_duration:      l.lap_duration,
      duration_sector_1: l.duration_sector_1,
      duration_sector_2: l.duration_sector_2,
      duration_sector_3: l.duration_sector_3,
      st_speed:          l.st_speed,
      date_start:        l.date_start.unwrap_or_default(),
    })
    .collect();

  Filtered { dropped: total - rows.len(), rows }
}

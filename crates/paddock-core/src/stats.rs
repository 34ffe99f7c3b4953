//! Aggregation engine — race and season statistics over a [`SeasonStore`].
//!
//! [`Stats`] is stateless: every call is a fresh read of the store. The
//! derivations that are not plain SQL (performance summary, podium split,
//! ranking) are free functions so they can be tested without a backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
  driver::Driver,
  session::Session,
  store::{ClassifiedEntry, DriverCount, DriverRaceRow, FastestLap, SeasonStore, TopSpeed},
};

/// Number of entries kept in each season ranking and on the podium.
pub const TOP_N: usize = 3;

// ─── Result records ──────────────────────────────────────────────────────────

/// One classified session in a driver's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
  pub session_key:        u32,
  pub circuit_short_name: String,
  pub race:               String,
  pub position:           u32,
  /// Whether the driver's best lap was the quickest of the session.
  pub fastest_lap:        bool,
  pub max_speed:          Option<f64>,
  pub best_lap_duration:  Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
  pub wins:           u32,
  pub top_3_finishes: u32,
  /// Highest speed-trap reading over all sessions, if any was recorded.
  pub max_speed:      Option<f64>,
}

/// Response of the driver-detail query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriverDetail {
  Results {
    driver_id:           u32,
    driver:              Option<Driver>,
    performance_summary: PerformanceSummary,
    race_results:        Vec<RaceResult>,
  },
  /// The driver holds no classification. `driver_known` tells an imported
  /// driver without sessions apart from an unknown number.
  NoResults { driver_id: u32, driver_known: bool },
}

/// Entry of the race list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSummary {
  pub session_key:        u32,
  pub country_name:       String,
  pub date_start:         String,
  pub year:               i32,
  pub circuit_short_name: String,
}

impl From<Session> for RaceSummary {
  fn from(s: Session) -> Self {
    RaceSummary {
      session_key:        s.session_key,
      country_name:       s.country_name,
      date_start:         s.date_start,
      year:               s.year,
      circuit_short_name: s.circuit_short_name,
    }
  }
}

/// Response of the race-detail query. Every part is absent (or empty) when
/// the session key is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceDetail {
  pub race_id:     u32,
  pub race:        Option<Session>,
  /// The podium, ascending position.
  pub results:     Vec<ClassifiedEntry>,
  /// The entry holding the highest recorded position.
  pub last_place:  Option<ClassifiedEntry>,
  pub classified:  usize,
  pub fastest_lap: Option<FastestLap>,
  pub max_speed:   Option<TopSpeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
  pub position:      u32,
  pub driver_number: u32,
  pub driver:        String,
  pub count:         u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
  pub season:               i32,
  pub top_3_winners:        Vec<RankingEntry>,
  pub top_3_fastest_laps:   Vec<RankingEntry>,
  /// Derived from race wins; see [`SeasonStore::pole_counts`].
  pub top_3_pole_positions: Vec<RankingEntry>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Read-only statistics over a store handle.
pub struct Stats<S> {
  store:  Arc<S>,
  season: i32,
}

impl<S> Clone for Stats<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store), season: self.season } }
}

impl<S: SeasonStore> Stats<S> {
  pub fn new(store: Arc<S>, season: i32) -> Self { Self { store, season } }

  pub async fn drivers(&self) -> Result<Vec<Driver>, S::Error> { self.store.list_drivers().await }

  pub async fn driver_detail(&self, driver_number: u32) -> Result<DriverDetail, S::Error> {
    let rows = self.store.driver_race_rows(driver_number).await?;
    let driver = self.store.get_driver(driver_number).await?;

    if rows.is_empty() {
      return Ok(DriverDetail::NoResults {
        driver_id:    driver_number,
        driver_known: driver.is_some(),
      });
    }

    let race_results: Vec<RaceResult> = rows.into_iter().map(race_result).collect();
    Ok(DriverDetail::Results {
      driver_id: driver_number,
      driver,
      performance_summary: summarise(&race_results),
      race_results,
    })
  }

  pub async fn races(&self) -> Result<Vec<RaceSummary>, S::Error> {
    let races = self.store.list_races().await?;
    Ok(races.into_iter().map(RaceSummary::from).collect())
  }

  pub async fn race_detail(&self, session_key: u32) -> Result<RaceDetail, S::Error> {
    let race = self.store.get_session(session_key).await?;
    let classification = self.store.session_classification(session_key).await?;
    let fastest_lap = self.store.fastest_lap(session_key).await?;
    let max_speed = self.store.top_speed(session_key).await?;

    let classified = classification.len();
    let (results, last_place) = split_podium(classification);

    Ok(RaceDetail {
      race_id: session_key,
      race,
      results,
      last_place,
      classified,
      fastest_lap,
      max_speed,
    })
  }

  pub async fn season_summary(&self) -> Result<SeasonSummary, S::Error> {
    let wins = self.store.win_counts().await?;
    let fastest = self.store.fastest_lap_counts().await?;
    let poles = self.store.pole_counts().await?;

    Ok(SeasonSummary {
      season:               self.season,
      top_3_winners:        rank_top(wins),
      top_3_fastest_laps:   rank_top(fastest),
      top_3_pole_positions: rank_top(poles),
    })
  }
}

// ─── Derivations ─────────────────────────────────────────────────────────────

fn race_result(row: DriverRaceRow) -> RaceResult {
  let fastest_lap = matches!(
    (row.best_lap_duration, row.session_fastest),
    (Some(best), Some(fastest)) if best <= fastest
  );
  RaceResult {
    session_key: row.session_key,
    circuit_short_name: row.circuit_short_name,
    race: row.session_name,
    position: row.position,
    fastest_lap,
    max_speed: row.max_speed,
    best_lap_duration: row.best_lap_duration,
  }
}

/// Wins, top-three finishes and peak speed over a driver's results.
pub fn summarise(results: &[RaceResult]) -> PerformanceSummary {
  let wins = results.iter().filter(|r| r.position == 1).count();
  let top_3 = results.iter().filter(|r| r.position <= 3).count();
  let max_speed = results
    .iter()
    .filter_map(|r| r.max_speed)
    .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |m| m.max(s))));

  PerformanceSummary {
    wins: u32::try_from(wins).unwrap_or(u32::MAX),
    top_3_finishes: u32::try_from(top_3).unwrap_or(u32::MAX),
    max_speed,
  }
}

/// Split a classification (ascending position) into the podium and the
/// entry with the highest position.
pub fn split_podium(
  mut classification: Vec<ClassifiedEntry>,
) -> (Vec<ClassifiedEntry>, Option<ClassifiedEntry>) {
  classification.sort_by_key(|e| (e.position, e.driver_number));
  let last_place = classification.last().cloned();
  classification.truncate(TOP_N);
  (classification, last_place)
}

/// Rank tallies by descending count, ties by ascending driver number, and
/// keep the top [`TOP_N`]. Zero tallies are not ranked.
pub fn rank_top(mut counts: Vec<DriverCount>) -> Vec<RankingEntry> {
  counts.retain(|c| c.count > 0);
  counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.driver_number.cmp(&b.driver_number)));
  counts
    .into_iter()
    .take(TOP_N)
    .zip(1..)
    .map(|(c, position)| RankingEntry {
      position,
      driver_number: c.driver_number,
      driver: c.driver,
      count: c.count,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tally(driver_number: u32, count: u32) -> DriverCount {
    DriverCount { driver_number, driver: format!("Driver {driver_number}"), count }
  }

  fn result(position: u32, max_speed: Option<f64>) -> RaceResult {
    RaceResult {
      session_key: position,
      circuit_short_name: "Monza".into(),
      race: "Race".into(),
      position,
      fastest_lap: false,
      max_speed,
      best_lap_duration: None,
    }
  }

  fn entry(position: u32, driver_number: u32) -> ClassifiedEntry {
    ClassifiedEntry {
      position,
      driver_number,
      driver: format!("Driver {driver_number}"),
      team: "Team".into(),
      country: "GBR".into(),
    }
  }

  #[test]
  fn ranking_orders_by_count_descending() {
    let ranked = rank_top(vec![tally(4, 2), tally(1, 3)]);
    assert_eq!(ranked.len(), 2);
    assert_eq!((ranked[0].driver_number, ranked[0].count, ranked[0].position), (1, 3, 1));
    assert_eq!((ranked[1].driver_number, ranked[1].count, ranked[1].position), (4, 2, 2));
  }

  #[test]
  fn ranking_breaks_ties_by_driver_number_and_truncates() {
    let ranked = rank_top(vec![tally(44, 1), tally(16, 1), tally(81, 2), tally(1, 1)]);
    let order: Vec<u32> = ranked.iter().map(|r| r.driver_number).collect();
    assert_eq!(order, vec![81, 1, 16]);
    assert_eq!(ranked.iter().map(|r| r.position).collect::<Vec<_>>(), vec![1, 2, 3]);
  }

  #[test]
  fn ranking_skips_zero_counts() {
    assert!(rank_top(vec![tally(1, 0)]).is_empty());
  }

  #[test]
  fn summary_counts_wins_and_top_three() {
    let summary = summarise(&[result(1, Some(320.5)), result(2, None), result(1, Some(331.0))]);
    assert_eq!(summary.wins, 2);
    assert_eq!(summary.top_3_finishes, 3);
    assert_eq!(summary.max_speed, Some(331.0));
  }

  #[test]
  fn summary_without_speeds_has_no_max() {
    let summary = summarise(&[result(7, None)]);
    assert_eq!(summary.wins, 0);
    assert_eq!(summary.top_3_finishes, 0);
    assert_eq!(summary.max_speed, None);
  }

  #[test]
  fn podium_is_lowest_three_and_last_is_highest() {
    let classification = (1..=8).rev().map(|p| entry(p, p + 10)).collect();
    let (podium, last) = split_podium(classification);
    assert_eq!(podium.iter().map(|e| e.position).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(last.map(|e| e.position), Some(8));
  }

  #[test]
  fn short_classification_is_its_own_podium() {
    let (podium, last) = split_podium(vec![entry(1, 1), entry(2, 2)]);
    assert_eq!(podium.len(), 2);
    assert_eq!(last.map(|e| e.driver_number), Some(2));

    let (podium, last) = split_podium(Vec::new());
    assert!(podium.is_empty());
    assert!(last.is_none());
  }

  #[test]
  fn fastest_lap_flag_requires_matching_session_minimum() {
    let row = |best, fastest| DriverRaceRow {
      session_key:        1,
      circuit_short_name: "Spa".into(),
      session_name:       "Race".into(),
      position:           2,
      best_lap_duration:  best,
      max_speed:          None,
      session_fastest:    fastest,
    };
    assert!(race_result(row(Some(90.5), Some(90.5))).fastest_lap);
    assert!(!race_result(row(Some(91.2), Some(90.5))).fastest_lap);
    assert!(!race_result(row(None, Some(90.5))).fastest_lap);
  }

  #[test]
  fn driver_detail_is_tagged_by_status() {
    let detail = DriverDetail::NoResults { driver_id: 99, driver_known: false };
    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["status"], "no_results");
    assert_eq!(json["driver_id"], 99);

    let back: DriverDetail = serde_json::from_value(json).unwrap();
    assert_eq!(back, detail);
  }
}

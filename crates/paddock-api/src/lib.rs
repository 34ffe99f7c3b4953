//! JSON REST API for Paddock.
//!
//! Exposes an axum [`Router`] backed by any [`SeasonStore`] through the
//! [`Stats`] engine. All endpoints are read-only.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", paddock_api::api_router(stats.clone()))
//! ```

pub mod drivers;
pub mod error;
pub mod races;
pub mod season;

use std::sync::Arc;

use axum::{Router, routing::get};
use paddock_core::{stats::Stats, store::SeasonStore};

pub use error::ApiError;

/// Build a fully-materialised API router over `stats`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(stats: Arc<Stats<S>>) -> Router<()>
where
  S: SeasonStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Drivers
    .route("/corredor", get(drivers::list::<S>))
    .route("/corredor/detalle/{id}", get(drivers::detail::<S>))
    // Races
    .route("/carrera", get(races::list::<S>))
    .route("/carrera/detalle/{id}", get(races::detail::<S>))
    // Season
    .route("/temporada/resumen", get(season::summary::<S>))
    .with_state(stats)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use paddock_core::{
    driver::Driver,
    session::Session,
    timing::{Lap, Position},
  };
  use paddock_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt;

  use super::*;

  fn driver(number: u32, first: &str, last: &str) -> Driver {
    Driver {
      driver_number: number,
      first_name:    first.into(),
      last_name:     last.into(),
      name_acronym:  last[..3].to_uppercase(),
      team_name:     "Team".into(),
      country_code:  "NED".into(),
    }
  }

  fn race(key: u32, circuit: &str, date: &str) -> Session {
    Session {
      session_key:        key,
      session_name:       "Race".into(),
      session_type:       "Race".into(),
      location:           circuit.into(),
      country_name:       circuit.into(),
      year:               2024,
      circuit_short_name: circuit.into(),
      date_start:         date.into(),
    }
  }

  fn lap(driver_number: u32, session_key: u32, lap_number: u32, duration: f64, speed: f64) -> Lap {
    Lap {
      driver_number,
      session_key,
      lap_number,
      lap_duration: Some(duration),
      duration_sector_1: Some(30.0),
      duration_sector_2: Some(30.0),
      duration_sector_3: Some(duration - 60.0),
      st_speed: Some(speed),
      date_start: String::new(),
    }
  }

  /// Two races, three drivers (one never classified).
  async fn seeded() -> Arc<Stats<SqliteStore>> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    for d in [
      driver(1, "Max", "Verstappen"),
      driver(16, "Charles", "Leclerc"),
      driver(43, "Franco", "Colapinto"),
    ] {
      store.insert_driver(d).await.unwrap();
    }
    store.insert_session(race(9000, "Sakhir", "2024-03-02T15:00:00+00:00")).await.unwrap();
    store.insert_session(race(9001, "Jeddah", "2024-03-09T17:00:00+00:00")).await.unwrap();

    let positions = vec![
      Position::new(1, 9000, 1, String::new()).unwrap(),
      Position::new(16, 9000, 2, String::new()).unwrap(),
      Position::new(16, 9001, 1, String::new()).unwrap(),
      Position::new(1, 9001, 2, String::new()).unwrap(),
    ];
    store.insert_positions(positions).await.unwrap();
    store
      .insert_laps(vec![
        lap(1, 9000, 1, 92.0, 310.0),
        lap(1, 9000, 2, 91.0, 315.0),
        lap(16, 9000, 1, 91.5, 320.0),
        lap(16, 9001, 1, 89.0, 305.0),
      ])
      .await
      .unwrap();

    Arc::new(Stats::new(Arc::new(store), 2024))
  }

  async fn get_json(stats: Arc<Stats<SqliteStore>>, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = api_router(stats).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  // ── Drivers ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn driver_list_is_ordered_by_number() {
    let (status, body) = get_json(seeded().await, "/corredor").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<u64> =
      body.as_array().unwrap().iter().map(|d| d["driver_number"].as_u64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 16, 43]);
  }

  #[tokio::test]
  async fn driver_detail_reports_history() {
    let (status, body) = get_json(seeded().await, "/corredor/detalle/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "results");
    assert_eq!(body["driver_id"], 1);
    assert_eq!(body["performance_summary"]["wins"], 1);
    assert_eq!(body["performance_summary"]["top_3_finishes"], 2);
    assert_eq!(body["performance_summary"]["max_speed"], 315.0);

    let results = body["race_results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let sakhir = results.iter().find(|r| r["session_key"] == 9000).unwrap();
    assert_eq!(sakhir["fastest_lap"], true);
    let jeddah = results.iter().find(|r| r["session_key"] == 9001).unwrap();
    assert_eq!(jeddah["fastest_lap"], false);
  }

  #[tokio::test]
  async fn unclassified_driver_gets_no_results() {
    let (status, body) = get_json(seeded().await, "/corredor/detalle/43").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "no_results");
    assert_eq!(body["driver_known"], true);

    let (_, body) = get_json(seeded().await, "/corredor/detalle/999").await;
    assert_eq!(body["status"], "no_results");
    assert_eq!(body["driver_known"], false);
  }

  #[tokio::test]
  async fn non_numeric_id_is_bad_request() {
    let (status, body) = get_json(seeded().await, "/corredor/detalle/max").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("max"));

    let (status, _) = get_json(seeded().await, "/carrera/detalle/-3").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Races ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn race_list_is_ordered_by_date() {
    let (status, body) = get_json(seeded().await, "/carrera").await;
    assert_eq!(status, StatusCode::OK);
    let circuits: Vec<&str> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|r| r["circuit_short_name"].as_str().unwrap())
      .collect();
    assert_eq!(circuits, vec!["Sakhir", "Jeddah"]);
  }

  #[tokio::test]
  async fn race_detail_has_podium_and_records() {
    let (status, body) = get_json(seeded().await, "/carrera/detalle/9000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["race"]["circuit_short_name"], "Sakhir");
    assert_eq!(body["results"][0]["driver"], "Max Verstappen");
    assert_eq!(body["last_place"]["driver_number"], 16);
    assert_eq!(body["fastest_lap"]["driver_number"], 1);
    assert_eq!(body["fastest_lap"]["lap_number"], 2);
    assert_eq!(body["max_speed"]["driver_number"], 16);
  }

  #[tokio::test]
  async fn unknown_race_is_empty_not_an_error() {
    let (status, body) = get_json(seeded().await, "/carrera/detalle/1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["race"].is_null());
    assert!(body["results"].as_array().unwrap().is_empty());
    assert!(body["fastest_lap"].is_null());
  }

  // ── Season ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn season_summary_ranks_drivers() {
    let (status, body) = get_json(seeded().await, "/temporada/resumen").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["season"], 2024);

    let winners = body["top_3_winners"].as_array().unwrap();
    assert_eq!(winners.len(), 2);
    assert_eq!(winners[0]["driver_number"], 1);
    assert_eq!(winners[1]["driver_number"], 16);
    assert_eq!(body["top_3_pole_positions"], body["top_3_winners"]);

    let fastest = body["top_3_fastest_laps"].as_array().unwrap();
    assert_eq!(fastest.len(), 2);
    assert_eq!(fastest[0]["count"], 1);
  }

  #[tokio::test]
  async fn unknown_route_is_404() {
    let req = Request::builder().uri("/pilotos").body(Body::empty()).unwrap();
    let resp = api_router(seeded().await).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}

//! Loader tests against a stub source and an in-memory SQLite store, plus
//! [`OpenF1Source`] tests against a local stand-in for the provider.

use std::{
  collections::{HashMap, HashSet},
  sync::Arc,
};

use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
use paddock_core::{
  stats::{DriverDetail, Stats},
  store::SeasonStore,
  timing::Lap,
};
use paddock_store_sqlite::SqliteStore;
use serde_json::json;

use crate::{
  Error, IngestPlan, IngestScope, Loader, OpenF1Source, ProviderConfig, Result,
  source::{ApiDriver, ApiLap, ApiPosition, ApiSession, TelemetrySource},
};

// ─── Stub source ─────────────────────────────────────────────────────────────

#[derive(Default, Clone)]
struct StubSource {
  drivers:   HashMap<u32, Vec<ApiDriver>>,
  sessions:  Vec<ApiSession>,
  positions: HashMap<u32, Vec<ApiPosition>>,
  laps:      HashMap<u32, Vec<ApiLap>>,
  /// Session keys whose every fetch fails.
  failing:   HashSet<u32>,
  fail_sessions: bool,
}

impl StubSource {
  fn check(&self, session_key: u32) -> Result<()> {
    if self.failing.contains(&session_key) {
      return Err(Error::Status { url: format!("stub://{session_key}"), status: 503 });
    }
    Ok(())
  }
}

impl TelemetrySource for StubSource {
  async fn drivers(&self, session_key: u32) -> Result<Vec<ApiDriver>> {
    self.check(session_key)?;
    Ok(self.drivers.get(&session_key).cloned().unwrap_or_default())
  }

  async fn race_sessions(&self, _year: i32) -> Result<Vec<ApiSession>> {
    if self.fail_sessions {
      return Err(Error::Status { url: "stub://sessions".into(), status: 500 });
    }
    Ok(self.sessions.clone())
  }

  async fn positions(&self, session_key: u32) -> Result<Vec<ApiPosition>> {
    self.check(session_key)?;
    Ok(self.positions.get(&session_key).cloned().unwrap_or_default())
  }

  async fn laps(&self, session_key: u32) -> Result<Vec<ApiLap>> {
    self.check(session_key)?;
    Ok(self.laps.get(&session_key).cloned().unwrap_or_default())
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

fn api_driver(number: u32, last: &str) -> ApiDriver {
  ApiDriver {
    driver_number: number,
    first_name:    Some(format!("First{number}")),
    last_name:     Some(last.into()),
    name_acronym:  Some(last.chars().take(3).collect::<String>().to_uppercase()),
    team_name:     Some("Team".into()),
    country_code:  None,
  }
}

fn api_session(key: u32, day: u32) -> ApiSession {
  ApiSession {
    session_key:        key,
    session_name:       Some("Race".into()),
    session_type:       Some("Race".into()),
    location:           Some(format!("Location {key}")),
    country_name:       Some(format!("Country {key}")),
    year:               2024,
    circuit_short_name: Some(format!("Circuit {key}")),
    date_start:         Some(format!("2024-04-{day:02}T13:00:00+00:00")),
  }
}

fn sample(driver_number: u32, session_key: u32, position: i64, minute: u32) -> ApiPosition {
  ApiPosition {
    driver_number,
    session_key,
    position: Some(position),
    date: Some(format!("2024-04-01T14:{minute:02}:00+00:00")),
  }
}

fn api_lap(driver_number: u32, session_key: u32, lap_number: u32, duration: f64) -> ApiLap {
  ApiLap {
    driver_number,
    session_key,
    lap_number,
    lap_duration: Some(duration),
    duration_sector_1: Some(duration / 3.0),
    duration_sector_2: Some(duration / 3.0),
    duration_sector_3: Some(duration / 3.0),
    st_speed: Some(300.0 + f64::from(driver_number)),
    date_start: None,
  }
}

/// Two races (9000, 9001); drivers 1, 11 and 16 allowed, 40 is a reserve
/// the provider also reports.
fn season() -> (StubSource, IngestPlan) {
  let mut src = StubSource::default();
  src.drivers.insert(9000, vec![
    api_driver(1, "Verstappen"),
    api_driver(11, "Perez"),
    api_driver(16, "Leclerc"),
    api_driver(40, "Lawson"),
  ]);
  src.sessions = vec![api_session(9000, 1), api_session(9001, 8)];

  src.positions.insert(9000, vec![
    sample(11, 9000, 1, 0),
    sample(1, 9000, 2, 0),
    sample(16, 9000, 3, 0),
    sample(40, 9000, 4, 0),
    sample(1, 9000, 1, 50),
    sample(11, 9000, 2, 50),
  ]);
  src.positions.insert(9001, vec![sample(16, 9001, 1, 0), sample(1, 9001, 2, 0)]);

  src.laps.insert(9000, vec![
    api_lap(1, 9000, 1, 91.2),
    api_lap(11, 9000, 1, 90.5),
    api_lap(16, 9000, 1, 92.0),
    api_lap(40, 9000, 1, 89.0),
  ]);
  src.laps.insert(9001, vec![api_lap(16, 9001, 1, 80.0), api_lap(1, 9001, 1, 80.4)]);

  let plan = IngestPlan {
    season: 2024,
    scopes: vec![IngestScope { session_key: 9000, drivers: vec![1, 11, 16] }],
  };
  (src, plan)
}

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

// ─── Loader ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_pass_imports_allowed_rows_only() {
  let store = store().await;
  let (src, plan) = season();

  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  assert_eq!(store.driver_numbers().await.unwrap(), vec![1, 11, 16]);
  assert_eq!(report.drivers.fetched, 4);
  assert_eq!(report.drivers.inserted, 3);
  assert_eq!(report.drivers.dropped, 1);
  assert_eq!(report.sessions.inserted, 2);
  assert_eq!(report.failed_scopes(), 0);

  let counts = store.counts().await.unwrap();
  assert_eq!(counts.positions, 5);
  assert_eq!(counts.laps, 5);
  assert_eq!(report.laps.dropped, 1);
  assert_eq!(report.positions.rejected + report.laps.rejected, 0);
}

#[tokio::test]
async fn final_position_wins_over_first_sample() {
  let store = store().await;
  let (src, plan) = season();
  Loader::new(Arc::clone(&store), src, plan).run().await;

  let classification = store.session_classification(9000).await.unwrap();
  let got: Vec<_> = classification.iter().map(|e| (e.position, e.driver_number)).collect();
  assert_eq!(got, vec![(1, 1), (2, 11), (3, 16)]);
}

#[tokio::test]
async fn second_pass_changes_nothing() {
  let store = store().await;
  let (src, plan) = season();
  let loader = Loader::new(Arc::clone(&store), src, plan);

  let first = loader.run().await;
  let counts = store.counts().await.unwrap();
  let stats = Stats::new(Arc::clone(&store), 2024);
  let summary = stats.season_summary().await.unwrap();
  let detail = stats.driver_detail(1).await.unwrap();

  let second = loader.run().await;
  assert!(first.inserted() > 0);
  assert_eq!(second.inserted(), 0);
  assert_eq!(second.positions.ignored, first.positions.inserted);
  assert_eq!(second.laps.ignored, first.laps.inserted);

  assert_eq!(store.counts().await.unwrap(), counts);
  assert_eq!(stats.season_summary().await.unwrap(), summary);
  assert_eq!(stats.driver_detail(1).await.unwrap(), detail);
}

#[tokio::test]
async fn every_stored_row_has_its_driver_and_session() {
  let store = store().await;
  let (src, plan) = season();
  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  let drivers: HashSet<u32> = store.driver_numbers().await.unwrap().into_iter().collect();
  for key in store.session_keys().await.unwrap() {
    assert!(store.get_session(key).await.unwrap().is_some());
    for entry in store.session_classification(key).await.unwrap() {
      assert!(drivers.contains(&entry.driver_number));
    }
  }
  // Joined reads see every stored position, so none are orphans.
  let joined: usize = {
    let mut n = 0;
    for key in store.session_keys().await.unwrap() {
      n += store.session_classification(key).await.unwrap().len();
    }
    n
  };
  assert_eq!(joined as u64, store.counts().await.unwrap().positions);

  // Laps: the reserve driver's lap never reached the store, and the schema
  // refuses a lap without its driver.
  assert_eq!(store.counts().await.unwrap().laps, report.laps.inserted as u64);
  for key in store.session_keys().await.unwrap() {
    let fastest = store.fastest_lap(key).await.unwrap().unwrap();
    assert!(drivers.contains(&fastest.driver_number));
  }
  let orphan = Lap {
    driver_number:     40,
    session_key:       9000,
    lap_number:        2,
    lap_duration:      Some(88.0),
    duration_sector_1: None,
    duration_sector_2: None,
    duration_sector_3: None,
    st_speed:          None,
    date_start:        String::new(),
  };
  let outcome = store.insert_laps(vec![orphan]).await.unwrap();
  assert_eq!(outcome.rejected, 1);
  assert_eq!(store.counts().await.unwrap().laps, report.laps.inserted as u64);
  assert_eq!(store.fastest_lap(9000).await.unwrap().unwrap().driver_number, 11);
}

#[tokio::test]
async fn only_races_of_the_season_are_imported() {
  let store = store().await;
  let (mut src, plan) = season();
  src.sessions.push(ApiSession {
    session_name: Some("Qualifying".into()),
    session_type: Some("Qualifying".into()),
    ..api_session(7, 2)
  });
  src.sessions.push(ApiSession { year: 2023, ..api_session(8, 3) });
  src.positions.insert(7, vec![sample(16, 7, 1, 0)]);
  src.positions.insert(8, vec![sample(16, 8, 1, 0)]);
  src.laps.insert(7, vec![api_lap(16, 7, 1, 70.0)]);

  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  assert_eq!(report.sessions.fetched, 4);
  assert_eq!(report.sessions.dropped, 2);
  assert_eq!(report.sessions.inserted, 2);
  assert_eq!(store.session_keys().await.unwrap(), vec![9000, 9001]);
  assert!(store.get_session(7).await.unwrap().is_none());
  assert!(store.session_classification(7).await.unwrap().is_empty());

  let counts = store.counts().await.unwrap();
  assert_eq!((counts.positions, counts.laps), (5, 5));

  let summary = Stats::new(Arc::clone(&store), 2024).season_summary().await.unwrap();
  let wins: Vec<_> =
    summary.top_3_winners.iter().map(|r| (r.driver_number, r.count)).collect();
  assert_eq!(wins, vec![(1, 1), (16, 1)]);
}

#[tokio::test]
async fn failing_session_does_not_stop_the_others() {
  let store = store().await;
  let (mut src, plan) = season();
  src.failing.insert(9001);

  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  assert_eq!(report.positions.failed, 1);
  assert_eq!(report.laps.failed, 1);
  assert_eq!(store.session_classification(9000).await.unwrap().len(), 3);
  assert!(store.session_classification(9001).await.unwrap().is_empty());
  assert!(store.fastest_lap(9000).await.unwrap().is_some());
}

#[tokio::test]
async fn failing_driver_scope_leaves_later_scopes_intact() {
  let store = store().await;
  let (mut src, mut plan) = season();
  src.drivers.insert(9001, vec![api_driver(44, "Hamilton")]);
  src.failing.insert(8000);
  plan.scopes.insert(0, IngestScope { session_key: 8000, drivers: vec![1] });
  plan.scopes.push(IngestScope { session_key: 9001, drivers: vec![44] });

  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  assert_eq!(report.drivers.failed, 1);
  assert_eq!(store.driver_numbers().await.unwrap(), vec![1, 11, 16, 44]);
}

#[tokio::test]
async fn session_fetch_failure_skips_dependent_imports() {
  let store = store().await;
  let (mut src, plan) = season();
  src.fail_sessions = true;

  let report = Loader::new(Arc::clone(&store), src, plan).run().await;

  assert_eq!(report.sessions.failed, 1);
  assert_eq!(report.drivers.inserted, 3);
  let counts = store.counts().await.unwrap();
  assert_eq!((counts.sessions, counts.positions, counts.laps), (0, 0, 0));
}

#[tokio::test]
async fn imported_season_answers_queries() {
  let store = store().await;
  let (src, plan) = season();
  Loader::new(Arc::clone(&store), src, plan).run().await;
  let stats = Stats::new(Arc::clone(&store), 2024);

  let race = stats.race_detail(9000).await.unwrap();
  let fastest = race.fastest_lap.unwrap();
  assert_eq!(fastest.driver_number, 11);
  assert_eq!(fastest.total_time, 90.5);

  let DriverDetail::Results { performance_summary, .. } = stats.driver_detail(1).await.unwrap()
  else {
    panic!("driver 1 has results");
  };
  assert_eq!(performance_summary.wins, 1);
  assert_eq!(performance_summary.top_3_finishes, 2);

  let summary = stats.season_summary().await.unwrap();
  let winners: Vec<_> = summary.top_3_winners.iter().map(|r| r.driver_number).collect();
  assert_eq!(winners, vec![1, 16]);
}

// ─── OpenF1Source ────────────────────────────────────────────────────────────

/// Serve a fake provider on an ephemeral port and return its base URL.
async fn fake_provider() -> String {
  let app = Router::new()
    .route(
      "/v1/drivers",
      get(|Query(q): Query<HashMap<String, String>>| async move {
        let key: u32 = q.get("session_key").and_then(|k| k.parse().ok()).unwrap_or(0);
        Json(json!([{
          "driver_number": 1,
          "first_name": "Max",
          "last_name": "Verstappen",
          "name_acronym": "VER",
          "team_name": "Red Bull Racing",
          "country_code": null,
          "session_key": key,
          "headshot_url": "https://example.invalid/ver.png"
        }]))
      }),
    )
    .route(
      "/v1/sessions",
      get(|Query(q): Query<HashMap<String, String>>| async move {
        if q.get("session_name").map(String::as_str) != Some("Race") {
          return (StatusCode::BAD_REQUEST, "missing session_name");
        }
        (StatusCode::OK, "[{\"session_key\": 9000, \"year\": \"not-a-year\"}]")
      }),
    )
    .route("/v1/position", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
    .route(
      "/v1/laps",
      get(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "No results found."}))) }),
    );

  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  format!("http://{addr}/v1/")
}

fn source(base_url: String) -> OpenF1Source {
  OpenF1Source::new(&ProviderConfig { base_url, timeout_secs: 5 }).unwrap()
}

#[tokio::test]
async fn openf1_decodes_drivers_and_ignores_extra_fields() {
  let src = source(fake_provider().await);
  let drivers = src.drivers(9000).await.unwrap();
  assert_eq!(drivers.len(), 1);
  assert_eq!(drivers[0].driver_number, 1);
  assert_eq!(drivers[0].country_code, None);
}

#[tokio::test]
async fn openf1_not_found_is_empty() {
  let src = source(fake_provider().await);
  assert!(src.laps(9000).await.unwrap().is_empty());
}

#[tokio::test]
async fn openf1_server_error_is_status_error() {
  let src = source(fake_provider().await);
  let err = src.positions(9000).await.unwrap_err();
  assert!(matches!(err, Error::Status { status: 500, .. }), "{err}");
}

#[tokio::test]
async fn openf1_malformed_payload_is_decode_error() {
  let src = source(fake_provider().await);
  let err = src.race_sessions(2024).await.unwrap_err();
  assert!(matches!(err, Error::Decode { .. }), "{err}");
}

#[tokio::test]
async fn openf1_unreachable_is_http_error() {
  let src = source("http://127.0.0.1:9/v1".into());
  let err = src.drivers(1).await.unwrap_err();
  assert!(matches!(err, Error::Http { .. }), "{err}");
}

//! [`Loader`] — one sequential ingestion pass.
//!
//! Order matters: drivers and sessions are imported first, then positions
//! and laps for every session present in the store. A failed fetch or store
//! call for one scope is logged and skipped; the pass always runs to the end.

use std::{collections::HashSet, sync::Arc};

use paddock_core::store::{BatchOutcome, SeasonStore};
use tracing::{info, warn};

use crate::{
  normalize::{self, Filtered},
  scope::IngestPlan,
  source::TelemetrySource,
};

// ─── Report ───────────────────────────────────────────────────────────────────

/// Row accounting for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityReport {
  /// Rows received from the provider.
  pub fetched:  usize,
  /// Rows discarded before writing (not allowed, orphaned, malformed).
  pub dropped:  usize,
  pub inserted: usize,
  /// Rows already present.
  pub ignored:  usize,
  /// Rows refused by a store constraint.
  pub rejected: usize,
  /// Scopes skipped because the fetch or store call failed.
  pub failed:   usize,
}

impl EntityReport {
  fn record(&mut self, fetched: usize, dropped: usize, outcome: BatchOutcome) {
    self.fetched += fetched;
    self.dropped += dropped;
    self.inserted += outcome.inserted;
    self.ignored += outcome.ignored;
    self.rejected += outcome.rejected;
  }
}

/// Outcome of a full ingestion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  pub drivers:   EntityReport,
  pub sessions:  EntityReport,
  pub positions: EntityReport,
  pub laps:      EntityReport,
}

impl IngestReport {
  pub fn inserted(&self) -> usize {
    self.drivers.inserted + self.sessions.inserted + self.positions.inserted + self.laps.inserted
  }

  pub fn failed_scopes(&self) -> usize {
    self.drivers.failed + self.sessions.failed + self.positions.failed + self.laps.failed
  }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Synchronises a store with a telemetry source for a fixed plan.
///
/// The loader is the only writer; it must not run concurrently with another
/// loader on the same store.
pub struct Loader<S, T> {
  store:  Arc<S>,
  source: T,
  plan:   IngestPlan,
}

impl<S, T> Loader<S, T>
where
  S: SeasonStore,
  T: TelemetrySource,
{
  pub fn new(store: Arc<S>, source: T, plan: IngestPlan) -> Self { Self { store, source, plan } }

  /// Run one full pass. Never fails: problems are logged and reflected in
  /// the returned report.
  pub async fn run(&self) -> IngestReport {
    info!(season = self.plan.season, scopes = self.plan.scopes.len(), "ingestion started");
    let mut report = IngestReport::default();

    self.import_drivers(&mut report.drivers).await;
    self.import_sessions(&mut report.sessions).await;

    let known_drivers: HashSet<u32> = match self.store.driver_numbers().await {
      Ok(numbers) => numbers.into_iter().collect(),
      Err(e) => {
        warn!(error = %e, "cannot list stored drivers; skipping positions and laps");
        report.positions.failed += 1;
        report.laps.failed += 1;
        return report;
      }
    };
    let session_keys = match self.store.session_keys().await {
      Ok(keys) => keys,
      Err(e) => {
        warn!(error = %e, "cannot list stored sessions; skipping positions and laps");
        report.positions.failed += 1;
        report.laps.failed += 1;
        return report;
      }
    };

    for &session_key in &session_keys {
      self.import_positions(session_key, &known_drivers, &mut report.positions).await;
    }
    for &session_key in &session_keys {
      self.import_laps(session_key, &known_drivers, &mut report.laps).await;
    }

    info!(
      inserted = report.inserted(),
      failed_scopes = report.failed_scopes(),
      drivers = ?report.drivers,
      sessions = ?report.sessions,
      positions = ?report.positions,
      laps = ?report.laps,
      "ingestion finished"
    );
    report
  }

  async fn import_drivers(&self, report: &mut EntityReport) {
    for scope in &self.plan.scopes {
      let fetched = match self.source.drivers(scope.session_key).await {
        Ok(drivers) => drivers,
        Err(e) => {
          warn!(session_key = scope.session_key, error = %e, "driver fetch failed");
          report.failed += 1;
          continue;
        }
      };

      let total = fetched.len();
      let allowed: Vec<_> = fetched.into_iter().filter(|d| scope.allows(d.driver_number)).collect();
      let mut outcome = BatchOutcome::default();
      for raw in allowed {
        let number = raw.driver_number;
        match self.store.insert_driver(normalize::driver(raw)).await {
          Ok(true) => outcome.inserted += 1,
          Ok(false) => outcome.ignored += 1,
          Err(e) => {
            warn!(driver_number = number, error = %e, "driver insert failed");
            outcome.rejected += 1;
          }
        }
      }

      info!(
        session_key = scope.session_key,
        fetched = total,
        inserted = outcome.inserted,
        "drivers imported"
      );
      report.record(total, total - outcome.total(), outcome);
    }
  }

  async fn import_sessions(&self, report: &mut EntityReport) {
    let fetched = match self.source.race_sessions(self.plan.season).await {
      Ok(sessions) => sessions,
      Err(e) => {
        warn!(season = self.plan.season, error = %e, "session fetch failed");
        report.failed += 1;
        return;
      }
    };

    let total = fetched.len();
    let mut dropped = 0;
    let mut outcome = BatchOutcome::default();
    for raw in fetched {
      let session = normalize::session(raw);
      let key = session.session_key;
      if !session.is_race() || session.year != self.plan.season {
        warn!(
          session_key = key,
          session_type = %session.session_type,
          year = session.year,
          "not a race of the configured season; skipped"
        );
        dropped += 1;
        continue;
      }
      match self.store.insert_session(session).await {
        Ok(true) => outcome.inserted += 1,
        Ok(false) => outcome.ignored += 1,
        Err(e) => {
          warn!(session_key = key, error = %e, "session insert failed");
          outcome.rejected += 1;
        }
      }
    }

    info!(
      season = self.plan.season,
      fetched = total,
      dropped,
      inserted = outcome.inserted,
      "sessions imported"
    );
    report.record(total, dropped, outcome);
  }

  async fn import_positions(
    &self,
    session_key: u32,
    known_drivers: &HashSet<u32>,
    report: &mut EntityReport,
  ) {
    let samples = match self.source.positions(session_key).await {
      Ok(samples) => samples,
      Err(e) => {
        warn!(session_key, error = %e, "position fetch failed");
        report.failed += 1;
        return;
      }
    };

    let fetched = samples.len();
    let Filtered { rows, dropped } =
      normalize::final_classification(samples, session_key, known_drivers);
    match self.store.insert_positions(rows).await {
      Ok(outcome) => {
        info!(session_key, fetched, dropped, inserted = outcome.inserted, "positions imported");
        report.record(fetched, dropped, outcome);
      }
      Err(e) => {
        warn!(session_key, error = %e, "position write failed");
        report.failed += 1;
      }
    }
  }

  async fn import_laps(
    &self,
    session_key: u32,
    known_drivers: &HashSet<u32>,
    report: &mut EntityReport,
  ) {
    let raw = match self.source.laps(session_key).await {
      Ok(laps) => laps,
      Err(e) => {
        warn!(session_key, error = %e, "lap fetch failed");
        report.failed += 1;
        return;
      }
    };

    let fetched = raw.len();
    let Filtered { rows, dropped } = normalize::laps(raw, session_key, known_drivers);
    match self.store.insert_laps(rows).await {
      Ok(outcome) => {
        info!(session_key, fetched, dropped, inserted = outcome.inserted, "laps imported");
        report.record(fetched, dropped, outcome);
      }
      Err(e) => {
        warn!(session_key, error = %e, "lap write failed");
        report.failed += 1;
      }
    }
  }
}

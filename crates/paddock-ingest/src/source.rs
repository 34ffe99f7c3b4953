//! The `TelemetrySource` trait and the upstream payload shapes.
//!
//! Payload structs mirror the provider's JSON loosely: every descriptive
//! field is optional because the provider omits or nulls them freely. Only
//! the keys are required; a row without its key fails the whole payload.

use std::future::Future;

use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiDriver {
  pub driver_number: u32,
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub name_acronym:  Option<String>,
  pub team_name:     Option<String>,
  pub country_code:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiSession {
  pub session_key:        u32,
  pub session_name:       Option<String>,
  pub session_type:       Option<String>,
  pub location:           Option<String>,
  pub country_name:       Option<String>,
  pub year:               i32,
  pub circuit_short_name: Option<String>,
  pub date_start:         Option<String>,
}

/// One sample of the provider's position time series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiPosition {
  pub driver_number: u32,
  pub session_key:   u32,
  pub position:      Option<i64>,
  pub date:          Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiLap {
  pub driver_number:     u32,
  pub session_key:       u32,
  pub lap_number:        u32,
  pub lap_duration:      Option<f64>,
  pub duration_sector_1: Option<f64>,
  pub duration_sector_2: Option<f64>,
  pub duration_sector_3: Option<f64>,
  pub st_speed:          Option<f64>,
  pub date_start:        Option<String>,
}

/// Read-only access to the telemetry provider.
///
/// Each call covers one scope; a failure affects only that scope.
pub trait TelemetrySource: Send + Sync {
  /// Drivers reported for a session.
  fn drivers(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Vec<ApiDriver>>> + Send + '_;

  /// Race sessions of a season.
  fn race_sessions(&self, year: i32) -> impl Future<Output = Result<Vec<ApiSession>>> + Send + '_;

  /// The position time series of a session.
  fn positions(
    &self,
    session_key: u32,
  ) -> impl Future<Output = Result<Vec<ApiPosition>>> + Send + '_;

  /// Every lap recorded in a session.
  fn laps(&self, session_key: u32) -> impl Future<Output = Result<Vec<ApiLap>>> + Send + '_;
}

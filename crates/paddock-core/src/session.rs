//! Session — one timed event of the season.

use serde::{Deserialize, Serialize};

/// The `session_type` value that marks a session as a race.
pub const RACE_SESSION_TYPE: &str = "Race";

/// A session as imported from the telemetry provider. Only sessions whose
/// `session_type` is [`RACE_SESSION_TYPE`] are listed as races.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
  pub session_key:        u32,
  pub session_name:       String,
  pub session_type:       String,
  pub location:           String,
  pub country_name:       String,
  pub year:               i32,
  pub circuit_short_name: String,
  /// ISO 8601 start timestamp as reported upstream.
  pub date_start:         String,
}

impl Session {
  pub fn is_race(&self) -> bool { self.session_type == RACE_SESSION_TYPE }
}

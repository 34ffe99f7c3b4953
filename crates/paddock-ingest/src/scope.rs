//! What to import: the season year and the per-session driver allow-lists.

use serde::Deserialize;

/// One configured session whose driver roster is imported, limited to the
/// listed driver numbers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestScope {
  pub session_key: u32,
  /// Drivers counted toward standings. Anything else the provider reports
  /// for this session (reserve or test drivers) is skipped.
  pub drivers:     Vec<u32>,
}

impl IngestScope {
  pub fn allows(&self, driver_number: u32) -> bool { self.drivers.contains(&driver_number) }
}

/// The full ingestion scope for one run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngestPlan {
  pub season: i32,
  #[serde(default)]
  pub scopes: Vec<IngestScope>,
}

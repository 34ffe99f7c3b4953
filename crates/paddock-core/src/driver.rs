//! Driver — a competitor identified by the provider's car number.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A driver as imported from the telemetry provider.
///
/// Immutable once stored: re-importing the same `driver_number` is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
  pub driver_number: u32,
  pub first_name:    String,
  pub last_name:     String,
  pub name_acronym:  String,
  pub team_name:     String,
  pub country_code:  String,
}

impl Driver {
  /// `"First Last"`, tolerating either half being blank.
  pub fn full_name(&self) -> String { full_name(&self.first_name, &self.last_name) }
}

/// Join a first and last name the way the API presents drivers.
pub fn full_name(first: &str, last: &str) -> String {
  match (first.trim(), last.trim()) {
    ("", last) => last.to_owned(),
    (first, "") => first.to_owned(),
    (first, last) => format!("{first} {last}"),
  }
}

/// Parse a path segment as a driver number or session key.
pub fn parse_id(raw: &str) -> Result<u32> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::InvalidId(raw.to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn full_name_joins_both_halves() {
    assert_eq!(full_name("Max", "Verstappen"), "Max Verstappen");
  }

  #[test]
  fn full_name_skips_blank_half() {
    assert_eq!(full_name("", "Zhou"), "Zhou");
    assert_eq!(full_name("Oliver ", "  "), "Oliver");
  }

  #[test]
  fn parse_id_rejects_non_numeric() {
    assert_eq!(parse_id("44").unwrap(), 44);
    assert!(matches!(parse_id("lewis"), Err(Error::InvalidId(s)) if s == "lewis"));
    assert!(parse_id("-1").is_err());
  }
}

//! Ingestion loader for the Paddock season store.
//!
//! Pulls drivers, race sessions, classifications and laps from a
//! [`TelemetrySource`] (OpenF1 in production) and writes them into any
//! [`paddock_core::store::SeasonStore`] with insert-if-absent semantics, so a
//! run can be repeated after a partial failure.

pub mod error;
pub mod loader;
pub mod normalize;
pub mod openf1;
pub mod scope;
pub mod source;

pub use error::{Error, Result};
pub use loader::{EntityReport, IngestReport, Loader};
pub use openf1::{OpenF1Source, ProviderConfig};
pub use scope::{IngestPlan, IngestScope};
pub use source::TelemetrySource;

#[cfg(test)]
mod tests;

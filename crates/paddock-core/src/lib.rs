//! Core types and trait definitions for the Paddock season store.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::SeasonStore`]; the aggregation engine
//! in [`stats`] derives race and season statistics from any such backend.

pub mod driver;
pub mod error;
pub mod session;
pub mod stats;
pub mod store;
pub mod timing;

pub use error::{Error, Result};

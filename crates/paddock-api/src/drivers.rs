//! Handlers for `/corredor` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/corredor` | All drivers by number |
//! | `GET`  | `/corredor/detalle/:id` | Race history + summary, or `no_results` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use paddock_core::{
  driver::{Driver, parse_id},
  stats::{DriverDetail, Stats},
  store::SeasonStore,
};

use crate::error::ApiError;

/// `GET /corredor`
pub async fn list<S>(State(stats): State<Arc<Stats<S>>>) -> Result<Json<Vec<Driver>>, ApiError>
where
  S: SeasonStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let drivers = stats
    .drivers()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(drivers))
}

/// `GET /corredor/detalle/:id`
pub async fn detail<S>(
  State(stats): State<Arc<Stats<S>>>,
  Path(id): Path<String>,
) -> Result<Json<DriverDetail>, ApiError>
where
  S: SeasonStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let driver_number = parse_id(&id)?;
  let detail = stats
    .driver_detail(driver_number)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(detail))
}

//! Handlers for `/carrera` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/carrera` | Race sessions by start date |
//! | `GET`  | `/carrera/detalle/:id` | Podium, last place, fastest lap, top speed |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use paddock_core::{
  driver::parse_id,
  stats::{RaceDetail, RaceSummary, Stats},
  store::SeasonStore,
};

use crate::error::ApiError;

/// `GET /carrera`
pub async fn list<S>(
  State(stats): State<Arc<Stats<S>>>,
) -> Result<Json<Vec<RaceSummary>>, ApiError>
where
  S: SeasonStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let races = stats.races().await.map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(races))
}

/// `GET /carrera/detalle/:id` — an unknown key yields `race: null` and
/// empty results.
pub async fn detail<S>(
  State(stats): State<Arc<Stats<S>>>,
  Path(id): Path<String>,
) -> Result<Json<RaceDetail>, ApiError>
where
  S: SeasonStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let session_key = parse_id(&id)?;
  let detail = stats
    .race_detail(session_key)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(detail))
}

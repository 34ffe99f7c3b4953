//! Handler for `GET /temporada/resumen`.

use std::sync::Arc;

use axum::{Json, extract::State};
use paddock_core::{
  stats::{SeasonSummary, Stats},
  store::SeasonStore,
};

use crate::error::ApiError;

/// `GET /temporada/resumen` — top three by wins, fastest laps and poles.
pub async fn summary<S>(
  State(stats): State<Arc<Stats<S>>>,
) -> Result<Json<SeasonSummary>, ApiError>
where
  S: SeasonStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let summary = stats
    .season_summary()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(summary))
}

use crate::error::AppError;
use crate::models::SpreadRequest;
use crate::state::AppState;
use axum::{extract::State, Json};
use chrono::Utc;
use valuation::SpreadValuation;

/// Price a spread against the current curve without creating an order.
/// Backs the live valuation panel in the trader view.
pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<SpreadRequest>,
) -> Result<Json<SpreadValuation>, AppError> {
    let spread = req.into_spread()?;
    let valuation = state
        .engine
        .value(&spread, &state.curves, Utc::now())
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(Json(valuation))
}

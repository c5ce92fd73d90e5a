use crate::error::AppError;
use crate::models::CurveUploadRequest;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use std::str::FromStr;
use types::curve::ForwardCurve;
use types::metal::Metal;

pub async fn list_curves(State(state): State<AppState>) -> Json<Vec<Metal>> {
    Json(state.curves.metals())
}

pub async fn get_curve(
    State(state): State<AppState>,
    Path(metal): Path<String>,
) -> Result<Json<ForwardCurve>, AppError> {
    let metal = Metal::from_str(&metal)?;
    let curve = state.curves.get(metal)?;
    Ok(Json(curve.as_ref().clone()))
}

/// Publish a curve, replacing the previous one for the metal.
pub async fn put_curve(
    State(state): State<AppState>,
    Path(metal): Path<String>,
    Json(req): Json<CurveUploadRequest>,
) -> Result<Json<ForwardCurve>, AppError> {
    let metal = Metal::from_str(&metal)?;
    let curve = req.into_curve(metal)?;
    state.curves.put(curve.clone());
    Ok(Json(curve))
}

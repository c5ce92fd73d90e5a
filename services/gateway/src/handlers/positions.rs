use crate::error::AppError;
use crate::models::{PositionsUploadRequest, UploadResponse};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;
use types::metal::Metal;
use types::position::Position;

#[derive(Debug, Default, Deserialize)]
pub struct PositionQuery {
    pub metal: Option<String>,
}

pub async fn list_positions(
    State(state): State<AppState>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<Vec<Position>>, AppError> {
    let positions = match query.metal.as_deref() {
        Some(name) => state.positions.for_metal(Metal::from_str(name)?),
        None => state.positions.all().as_ref().clone(),
    };
    Ok(Json(positions))
}

/// Replace the maker's position set with a fresh upload.
pub async fn put_positions(
    State(state): State<AppState>,
    Json(req): Json<PositionsUploadRequest>,
) -> Json<UploadResponse> {
    let positions: Vec<Position> = req
        .positions
        .into_iter()
        .map(|row| Position::new(row.metal, row.date, row.lots))
        .collect();
    let count = positions.len();
    state.positions.replace(positions);
    Json(UploadResponse { count })
}

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use matching::{
    compute_axes, compute_candidate_matches, position_impact, MarketAxis, MatchCandidate,
    PositionDelta,
};
use types::ids::OrderId;

/// Netted per-date interest across all live orders.
pub async fn list_axes(State(state): State<AppState>) -> Json<Vec<MarketAxis>> {
    Json(compute_axes(&state.orders.live()))
}

/// Scored pairs of live orders that could trade against each other.
pub async fn list_matches(State(state): State<AppState>) -> Json<Vec<MatchCandidate>> {
    Json(compute_candidate_matches(&state.orders.live()))
}

/// Estimated book impact of accepting one order.
pub async fn order_impact(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<PositionDelta>>, AppError> {
    let order = state
        .orders
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Order not found: {id}")))?;
    let positions = state.positions.for_metal(order.metal);
    Ok(Json(position_impact(&order, &positions)))
}

use crate::error::AppError;
use crate::models::{SubmitOrderRequest, TransitionRequest};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use order_store::OrderFilter;
use serde::Deserialize;
use std::str::FromStr;
use types::ids::{OrderId, UserId};
use types::metal::Metal;
use types::order::{Order, OrderStatus};

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub user: Option<String>,
    pub metal: Option<String>,
    pub status: Option<String>,
}

impl OrderListQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let metal = self
            .metal
            .as_deref()
            .map(Metal::from_str)
            .transpose()?;
        let status = self.status.as_deref().map(parse_status).transpose()?;
        Ok(OrderFilter {
            user: self.user.map(UserId::new),
            metal,
            status,
        })
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, AppError> {
    match s.to_ascii_uppercase().as_str() {
        "SUBMITTED" => Ok(OrderStatus::Submitted),
        "COUNTERED" => Ok(OrderStatus::Countered),
        "ACCEPTED" => Ok(OrderStatus::Accepted),
        "REJECTED" => Ok(OrderStatus::Rejected),
        "EXPIRED" => Ok(OrderStatus::Expired),
        other => Err(AppError::BadRequest(format!("Unknown status: {other}"))),
    }
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let filter = query.into_filter()?;
    Ok(Json(state.orders.list(&filter)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    state
        .orders
        .get(id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Order not found: {id}")))
}

pub async fn submit_order(
    State(state): State<AppState>,
    Json(req): Json<SubmitOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let spread = req.spread.into_spread()?;
    let order = state
        .lifecycle
        .submit(spread, req.submitted_by, req.loss_threshold)?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn propose_transition(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<Order>, AppError> {
    let updated = state
        .lifecycle
        .propose(id, req.expected_version, req.action.into())?;
    Ok(Json(updated))
}

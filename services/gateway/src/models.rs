//! Request and response bodies.
//!
//! Requests arrive as plain shapes and go through the domain
//! constructors, so every invariant (leg count, date ordering, curve
//! point ordering) is enforced server-side rather than trusted from
//! the wire.

use chrono::{DateTime, NaiveDate, Utc};
use order_store::TransitionAction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::curve::{CurvePoint, ForwardCurve};
use types::errors::{CurveError, SpreadError};
use types::ids::UserId;
use types::metal::Metal;
use types::spread::{Direction, Spread, SpreadLeg};

#[derive(Debug, Deserialize)]
pub struct LegRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub direction: Direction,
    pub lots: u32,
}

#[derive(Debug, Deserialize)]
pub struct SpreadRequest {
    pub metal: Metal,
    pub legs: Vec<LegRequest>,
}

impl SpreadRequest {
    pub fn into_spread(self) -> Result<Spread, SpreadError> {
        let legs = self
            .legs
            .into_iter()
            .map(|leg| SpreadLeg::new(leg.start_date, leg.end_date, leg.direction, leg.lots))
            .collect();
        Spread::new(self.metal, legs)
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitOrderRequest {
    #[serde(flatten)]
    pub spread: SpreadRequest,
    pub submitted_by: UserId,
    pub loss_threshold: Option<Decimal>,
}

/// One lifecycle transition attempt against a known version.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub expected_version: u64,
    #[serde(flatten)]
    pub action: ActionRequest,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Counter {
        price: Decimal,
        proposer: UserId,
        message: Option<String>,
    },
    Accept {
        by: UserId,
    },
    Reject {
        by: UserId,
        message: Option<String>,
    },
    Expire,
}

impl From<ActionRequest> for TransitionAction {
    fn from(req: ActionRequest) -> Self {
        match req {
            ActionRequest::Counter {
                price,
                proposer,
                message,
            } => TransitionAction::Counter {
                price,
                proposer,
                message,
            },
            ActionRequest::Accept { by } => TransitionAction::Accept { by },
            ActionRequest::Reject { by, message } => TransitionAction::Reject { by, message },
            ActionRequest::Expire => TransitionAction::Expire,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CurvePointRequest {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CurveUploadRequest {
    pub points: Vec<CurvePointRequest>,
    /// Defaults to the upload time.
    pub published_at: Option<DateTime<Utc>>,
}

impl CurveUploadRequest {
    pub fn into_curve(self, metal: Metal) -> Result<ForwardCurve, CurveError> {
        let points = self
            .points
            .into_iter()
            .map(|p| CurvePoint::new(p.date, p.value))
            .collect();
        ForwardCurve::new(metal, points, self.published_at.unwrap_or_else(Utc::now))
    }
}

#[derive(Debug, Deserialize)]
pub struct PositionRow {
    pub metal: Metal,
    pub date: NaiveDate,
    pub lots: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct PositionsUploadRequest {
    pub positions: Vec<PositionRow>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub count: usize,
}

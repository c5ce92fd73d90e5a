//! Error taxonomy for the engine
//!
//! Typed outcomes using thiserror. Valuation and transition failures are
//! returned to callers, never defaulted: a failed valuation is an error,
//! not a zero value, and a version conflict is an expected concurrency
//! signal rather than a fault.

use crate::ids::OrderId;
use crate::metal::Metal;
use crate::order::OrderStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Curve lookup and construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("No curve published for {metal}")]
    NotFound { metal: Metal },

    #[error("Curve has no points")]
    Empty,

    #[error("Curve points not strictly increasing at index {index}")]
    UnorderedPoints { index: usize },

    #[error("{date} is outside the {metal} curve range [{first}, {last}]")]
    OutOfRange {
        metal: Metal,
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
}

/// Spread construction errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpreadError {
    #[error("Spread needs at least {min} legs, got {count}")]
    TooFewLegs { count: usize, min: usize },

    #[error("Spread allows at most {max} legs, got {count}")]
    TooManyLegs { count: usize, max: usize },

    #[error("Leg {index}: start date {start} is not before end date {end}")]
    EmptyDateSpan {
        index: usize,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Leg {index}: lots must be positive")]
    ZeroLots { index: usize },
}

/// Valuation errors
///
/// `IncompleteCurve` short-circuits the whole spread: no partial totals
/// are ever returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("No curve published for {metal}")]
    CurveNotFound { metal: Metal },

    #[error("Incomplete curve for {metal}: leg {leg_index} touches {date} outside the covered range")]
    IncompleteCurve {
        metal: Metal,
        leg_index: usize,
        date: NaiveDate,
    },

    #[error("Invalid spread: {0}")]
    InvalidSpread(#[from] SpreadError),
}

/// Order transition errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("Order not found: {order_id}")]
    NotFound { order_id: OrderId },

    #[error("Version conflict on {order_id}: expected {expected}, current {actual}")]
    Conflict {
        order_id: OrderId,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Counter deviates {deviation} from submission valuation, above the {threshold} loss threshold")]
    LossThresholdExceeded {
        deviation: Decimal,
        threshold: Decimal,
    },

    #[error("Accepting a counter requires a countered price on record")]
    NoCounterOnRecord { order_id: OrderId },

    #[error("Order was submitted at-valuation-only; counters are not accepted")]
    CountersNotAllowed { order_id: OrderId },
}

impl TransitionError {
    /// Conflicts are an expected concurrency signal; callers re-read and
    /// retry rather than treating them as failures.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransitionError::Conflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_out_of_range_display() {
        let err = CurveError::OutOfRange {
            metal: Metal::Zinc,
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            first: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        };
        assert!(err.to_string().contains("Zinc"));
        assert!(err.to_string().contains("2024-03-01"));
    }

    #[test]
    fn test_valuation_error_from_spread_error() {
        let spread_err = SpreadError::TooFewLegs { count: 1, min: 2 };
        let val_err: ValuationError = spread_err.into();
        assert!(matches!(val_err, ValuationError::InvalidSpread(_)));
    }

    #[test]
    fn test_conflict_is_retryable() {
        let conflict = TransitionError::Conflict {
            order_id: OrderId::new(),
            expected: 1,
            actual: 2,
        };
        assert!(conflict.is_retryable());

        let invalid = TransitionError::InvalidTransition {
            from: OrderStatus::Accepted,
            to: OrderStatus::Countered,
        };
        assert!(!invalid.is_retryable());
    }
}

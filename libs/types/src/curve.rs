//! Forward curve model
//!
//! A curve is an ordered series of (date, value) points for one metal.
//! Curves are immutable once published; a new upload replaces the whole
//! curve for that metal atomically. Interpolation lives in the valuation
//! service; this module only guarantees the ordering invariant.

use crate::errors::CurveError;
use crate::metal::Metal;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single point on a forward curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl CurvePoint {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }
}

/// An immutable forward curve for one metal.
///
/// Invariant: points are strictly increasing by date, no duplicates.
/// Enforced at construction; the point vector is not publicly mutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardCurve {
    pub metal: Metal,
    points: Vec<CurvePoint>,
    pub published_at: DateTime<Utc>,
}

impl ForwardCurve {
    /// Build a curve, validating the ordering invariant.
    pub fn new(
        metal: Metal,
        points: Vec<CurvePoint>,
        published_at: DateTime<Utc>,
    ) -> Result<Self, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[0].date >= pair[1].date {
                return Err(CurveError::UnorderedPoints { index: i + 1 });
            }
        }
        Ok(Self {
            metal,
            points,
            published_at,
        })
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    /// First covered date.
    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    /// Last covered date.
    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    /// Whether `date` falls inside the covered range (inclusive).
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.first_date() && date <= self.last_date()
    }

    /// Whether the whole span [start, end] is covered.
    pub fn covers_span(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.covers(start) && self.covers(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn curve(points: Vec<(NaiveDate, i64)>) -> Result<ForwardCurve, CurveError> {
        ForwardCurve::new(
            Metal::Zinc,
            points
                .into_iter()
                .map(|(date, v)| CurvePoint::new(date, Decimal::from(v)))
                .collect(),
            Utc::now(),
        )
    }

    #[test]
    fn test_valid_curve() {
        let c = curve(vec![(d(2024, 1, 1), 100), (d(2024, 2, 1), 102)]).unwrap();
        assert_eq!(c.first_date(), d(2024, 1, 1));
        assert_eq!(c.last_date(), d(2024, 2, 1));
        assert!(c.covers(d(2024, 1, 15)));
        assert!(!c.covers(d(2024, 2, 2)));
    }

    #[test]
    fn test_empty_curve_rejected() {
        assert_eq!(curve(vec![]).unwrap_err(), CurveError::Empty);
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let err = curve(vec![(d(2024, 1, 1), 100), (d(2024, 1, 1), 101)]).unwrap_err();
        assert_eq!(err, CurveError::UnorderedPoints { index: 1 });
    }

    #[test]
    fn test_out_of_order_dates_rejected() {
        let err = curve(vec![
            (d(2024, 1, 1), 100),
            (d(2024, 3, 1), 101),
            (d(2024, 2, 1), 102),
        ])
        .unwrap_err();
        assert_eq!(err, CurveError::UnorderedPoints { index: 2 });
    }
}

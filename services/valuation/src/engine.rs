//! Spread valuation engine
//!
//! Prices each leg against a single curve snapshot taken at the start of
//! the valuation, so a concurrent curve replacement can never produce a
//! mixed-curve total. Any leg touching a date outside the curve range
//! fails the whole valuation with `IncompleteCurve`; no partial totals.
//!
//! Leg value: `sign(direction) × differential × tonnes_per_lot × lots`,
//! Borrow positive, Lend negative. The differential depends on the
//! configured curve convention (see `CurveConvention`).

use crate::store::{price_on, CurveStore};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::curve::ForwardCurve;
use types::errors::{CurveError, ValuationError};
use types::metal::Metal;
use types::spread::{Spread, SpreadLeg};

/// How curve values are read when pricing a leg's span.
///
/// The publication format varies by source, so the convention is a
/// policy choice rather than a hard-coded rule:
///
/// - `OutrightPrices` (default): points are outright forward prices; a
///   leg's differential is `price(end) − price(start)`.
/// - `PerDayRates`: points are per-day carry rates (LME C–3M sheets);
///   a leg's differential is the trapezoidal mean of the boundary rates
///   multiplied by the span's calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveConvention {
    #[default]
    OutrightPrices,
    PerDayRates,
}

/// Valuation detail for one leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegValuation {
    pub leg: SpreadLeg,
    /// Curve value at the leg's start date.
    pub start_value: Decimal,
    /// Curve value at the leg's end date.
    pub end_value: Decimal,
    /// Unsigned differential under the active convention.
    pub differential: Decimal,
    /// Signed, lot- and tonnage-scaled leg value.
    pub value: Decimal,
}

/// A complete spread valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadValuation {
    pub metal: Metal,
    pub legs: Vec<LegValuation>,
    pub total: Decimal,
    pub convention: CurveConvention,
    pub valued_at: DateTime<Utc>,
}

/// Stateless valuation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValuationEngine {
    convention: CurveConvention,
}

impl ValuationEngine {
    pub fn new(convention: CurveConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> CurveConvention {
        self.convention
    }

    /// Value a spread against the current curve for its metal.
    pub fn value(
        &self,
        spread: &Spread,
        curves: &CurveStore,
        as_of: DateTime<Utc>,
    ) -> Result<SpreadValuation, ValuationError> {
        let curve = curves.get(spread.metal).map_err(|_| {
            ValuationError::CurveNotFound {
                metal: spread.metal,
            }
        })?;
        self.value_on(spread, &curve, as_of)
    }

    /// Value a spread against an explicit curve snapshot.
    pub fn value_on(
        &self,
        spread: &Spread,
        curve: &ForwardCurve,
        as_of: DateTime<Utc>,
    ) -> Result<SpreadValuation, ValuationError> {
        let mut legs = Vec::with_capacity(spread.legs().len());
        let mut total = Decimal::ZERO;

        for (leg_index, leg) in spread.legs().iter().enumerate() {
            let start_value = lookup(curve, leg.start_date, leg_index)?;
            let end_value = lookup(curve, leg.end_date, leg_index)?;

            let differential = match self.convention {
                CurveConvention::OutrightPrices => end_value - start_value,
                CurveConvention::PerDayRates => {
                    let mean_rate = (start_value + end_value) / Decimal::from(2);
                    mean_rate * Decimal::from(leg.days())
                }
            };

            let value = leg.direction.sign()
                * differential
                * spread.metal.tonnes_per_lot()
                * Decimal::from(leg.lots);

            total += value;
            legs.push(LegValuation {
                leg: *leg,
                start_value,
                end_value,
                differential,
                value,
            });
        }

        Ok(SpreadValuation {
            metal: spread.metal,
            legs,
            total,
            convention: self.convention,
            valued_at: as_of,
        })
    }
}

fn lookup(
    curve: &ForwardCurve,
    date: chrono::NaiveDate,
    leg_index: usize,
) -> Result<Decimal, ValuationError> {
    price_on(curve, date).map_err(|err| match err {
        CurveError::OutOfRange { metal, date, .. } => ValuationError::IncompleteCurve {
            metal,
            leg_index,
            date,
        },
        _ => ValuationError::CurveNotFound { metal: curve.metal },
    })
}

//! Spread legs and validated spreads
//!
//! A spread is 2–3 borrow/lend legs on one metal, priced as a unit. The
//! sign convention is fixed engine-wide: Borrow = +1, Lend = −1
//! ("Borrow-minus-Lend"), applied uniformly in valuation, axes, and
//! maker impact.

use crate::errors::SpreadError;
use crate::metal::Metal;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Minimum legs in a spread.
pub const MIN_LEGS: usize = 2;
/// Maximum legs in a spread.
pub const MAX_LEGS: usize = 3;

/// Direction of a single leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Borrow,
    Lend,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Borrow => Direction::Lend,
            Direction::Lend => Direction::Borrow,
        }
    }

    /// Signed unit under the Borrow-minus-Lend convention.
    pub fn sign(&self) -> Decimal {
        match self {
            Direction::Borrow => Decimal::ONE,
            Direction::Lend => Decimal::NEGATIVE_ONE,
        }
    }
}

/// A single borrow/lend commitment over a date span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadLeg {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub direction: Direction,
    pub lots: u32,
}

impl SpreadLeg {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, direction: Direction, lots: u32) -> Self {
        Self {
            start_date,
            end_date,
            direction,
            lots,
        }
    }

    /// Calendar days in the span.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Signed lot exposure (Borrow positive, Lend negative).
    pub fn signed_lots(&self) -> Decimal {
        self.direction.sign() * Decimal::from(self.lots)
    }

    /// Whether this leg's span overlaps another's (inclusive bounds).
    pub fn overlaps(&self, other: &SpreadLeg) -> bool {
        self.start_date.max(other.start_date) <= self.end_date.min(other.end_date)
    }
}

/// A validated multi-leg spread on one metal.
///
/// Invariants (enforced by `new`): 2–3 legs, each with a non-empty date
/// span and positive lots. Legs need not be contiguous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spread {
    pub metal: Metal,
    legs: Vec<SpreadLeg>,
}

impl Spread {
    pub fn new(metal: Metal, legs: Vec<SpreadLeg>) -> Result<Self, SpreadError> {
        if legs.len() < MIN_LEGS {
            return Err(SpreadError::TooFewLegs {
                count: legs.len(),
                min: MIN_LEGS,
            });
        }
        if legs.len() > MAX_LEGS {
            return Err(SpreadError::TooManyLegs {
                count: legs.len(),
                max: MAX_LEGS,
            });
        }
        for (index, leg) in legs.iter().enumerate() {
            if leg.start_date >= leg.end_date {
                return Err(SpreadError::EmptyDateSpan {
                    index,
                    start: leg.start_date,
                    end: leg.end_date,
                });
            }
            if leg.lots == 0 {
                return Err(SpreadError::ZeroLots { index });
            }
        }
        Ok(Self { metal, legs })
    }

    pub fn legs(&self) -> &[SpreadLeg] {
        &self.legs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn leg(start: NaiveDate, end: NaiveDate, direction: Direction, lots: u32) -> SpreadLeg {
        SpreadLeg::new(start, end, direction, lots)
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Borrow.sign(), Decimal::ONE);
        assert_eq!(Direction::Lend.sign(), Decimal::NEGATIVE_ONE);
        assert_eq!(Direction::Borrow.opposite(), Direction::Lend);
    }

    #[test]
    fn test_two_leg_spread() {
        let spread = Spread::new(
            Metal::Zinc,
            vec![
                leg(d(2024, 1, 1), d(2024, 1, 16), Direction::Borrow, 10),
                leg(d(2024, 1, 16), d(2024, 2, 1), Direction::Lend, 10),
            ],
        )
        .unwrap();
        assert_eq!(spread.legs().len(), 2);
        assert_eq!(spread.legs()[0].days(), 15);
        assert_eq!(spread.legs()[0].signed_lots(), Decimal::from(10));
        assert_eq!(spread.legs()[1].signed_lots(), Decimal::from(-10));
    }

    #[test]
    fn test_single_leg_rejected() {
        let err = Spread::new(
            Metal::Zinc,
            vec![leg(d(2024, 1, 1), d(2024, 1, 16), Direction::Borrow, 10)],
        )
        .unwrap_err();
        assert_eq!(err, SpreadError::TooFewLegs { count: 1, min: 2 });
    }

    #[test]
    fn test_four_legs_rejected() {
        let legs = (0..4)
            .map(|i| leg(d(2024, 1, 1 + i), d(2024, 2, 1), Direction::Borrow, 1))
            .collect();
        let err = Spread::new(Metal::Zinc, legs).unwrap_err();
        assert_eq!(err, SpreadError::TooManyLegs { count: 4, max: 3 });
    }

    #[test]
    fn test_inverted_leg_dates_rejected() {
        let err = Spread::new(
            Metal::Zinc,
            vec![
                leg(d(2024, 1, 16), d(2024, 1, 1), Direction::Borrow, 10),
                leg(d(2024, 1, 16), d(2024, 2, 1), Direction::Lend, 10),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, SpreadError::EmptyDateSpan { index: 0, .. }));
    }

    #[test]
    fn test_zero_lots_rejected() {
        let err = Spread::new(
            Metal::Zinc,
            vec![
                leg(d(2024, 1, 1), d(2024, 1, 16), Direction::Borrow, 0),
                leg(d(2024, 1, 16), d(2024, 2, 1), Direction::Lend, 10),
            ],
        )
        .unwrap_err();
        assert_eq!(err, SpreadError::ZeroLots { index: 0 });
    }

    #[test]
    fn test_leg_overlap() {
        let a = leg(d(2024, 1, 1), d(2024, 1, 16), Direction::Borrow, 10);
        let b = leg(d(2024, 1, 10), d(2024, 1, 20), Direction::Lend, 5);
        let c = leg(d(2024, 2, 1), d(2024, 2, 10), Direction::Lend, 5);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    proptest::proptest! {
        /// Any pair of legs with ordered dates and positive lots builds.
        #[test]
        fn prop_well_formed_legs_always_accepted(
            start in 1u32..20,
            span_a in 1u32..5,
            span_b in 1u32..5,
            lots in 1u32..1000,
        ) {
            let mid = start + span_a;
            let spread = Spread::new(
                Metal::Copper,
                vec![
                    leg(d(2024, 1, start), d(2024, 1, mid), Direction::Borrow, lots),
                    leg(d(2024, 1, mid), d(2024, 1, mid + span_b), Direction::Lend, lots),
                ],
            );
            proptest::prop_assert!(spread.is_ok());
        }

        /// Overlap is symmetric.
        #[test]
        fn prop_overlap_symmetric(
            s1 in 1u32..25, e1 in 1u32..5,
            s2 in 1u32..25, e2 in 1u32..5,
        ) {
            let a = leg(d(2024, 1, s1), d(2024, 1, s1 + e1), Direction::Borrow, 1);
            let b = leg(d(2024, 1, s2), d(2024, 1, s2 + e2), Direction::Lend, 1);
            proptest::prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}

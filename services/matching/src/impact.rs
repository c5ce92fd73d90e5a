//! Maker position impact
//!
//! Estimates the per-date lot deltas the maker's book would absorb if
//! an order were accepted. The maker takes the other side of every leg:
//! a trader Borrow adds lots to the maker, a trader Lend removes them.
//! An estimate only; P&L and margin are out of scope.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::metal::Metal;
use types::order::Order;
use types::position::Position;

/// Signed change to one maker position row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionDelta {
    pub metal: Metal,
    pub date: NaiveDate,
    pub delta_lots: Decimal,
    /// Maker's exposure on this date before the order, zero if none.
    pub current_lots: Decimal,
    /// True when the delta moves the existing exposure toward zero.
    pub reduces_exposure: bool,
}

/// Per-date deltas for accepting `order` against the maker's positions.
pub fn position_impact(order: &Order, positions: &[Position]) -> Vec<PositionDelta> {
    let book: BTreeMap<(Metal, NaiveDate), Decimal> = positions
        .iter()
        .map(|pos| ((pos.metal, pos.date), pos.lots))
        .collect();

    let mut deltas: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for leg in order.spread.legs() {
        // Maker takes the opposite side of the trader's leg
        let maker_lots = -leg.signed_lots();
        let mut date = leg.start_date;
        while date < leg.end_date {
            *deltas.entry(date).or_insert(Decimal::ZERO) += maker_lots;
            date = date.succ_opt().expect("date overflow");
        }
    }

    deltas
        .into_iter()
        .filter(|(_, delta)| !delta.is_zero())
        .map(|(date, delta_lots)| {
            let current_lots = book
                .get(&(order.metal, date))
                .copied()
                .unwrap_or(Decimal::ZERO);
            PositionDelta {
                metal: order.metal,
                date,
                delta_lots,
                current_lots,
                reduces_exposure: current_lots * delta_lots < Decimal::ZERO,
            }
        })
        .collect()
}

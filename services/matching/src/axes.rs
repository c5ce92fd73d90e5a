//! Axis aggregation
//!
//! An axis is the netted market interest for one (metal, date): every
//! live order's legs contribute signed lots (Borrow +, Lend −) to each
//! date their span touches. Axes are sorted for display by descending
//! absolute interest, ties broken by earliest date, then metal.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::ids::OrderId;
use types::metal::Metal;
use types::order::Order;

/// Netted market interest for one metal/date. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAxis {
    pub metal: Metal,
    pub date: NaiveDate,
    /// Signed net lots: positive is net borrow interest.
    pub net_interest: Decimal,
    pub contributing_order_ids: Vec<OrderId>,
}

/// Aggregate live orders into display-sorted axes.
///
/// Terminal orders contribute nothing. A leg touches every date in
/// `[start_date, end_date)`; the end date is the unwind, not a day of
/// exposure.
pub fn compute_axes(orders: &[Order]) -> Vec<MarketAxis> {
    let mut buckets: BTreeMap<(Metal, NaiveDate), (Decimal, Vec<OrderId>)> = BTreeMap::new();

    for order in orders.iter().filter(|order| order.is_live()) {
        for leg in order.spread.legs() {
            let mut date = leg.start_date;
            while date < leg.end_date {
                let bucket = buckets
                    .entry((order.metal, date))
                    .or_insert_with(|| (Decimal::ZERO, Vec::new()));
                bucket.0 += leg.signed_lots();
                if !bucket.1.contains(&order.id) {
                    bucket.1.push(order.id);
                }
                date = date.succ_opt().expect("date overflow");
            }
        }
    }

    let mut axes: Vec<MarketAxis> = buckets
        .into_iter()
        .map(|((metal, date), (net_interest, contributing_order_ids))| MarketAxis {
            metal,
            date,
            net_interest,
            contributing_order_ids,
        })
        .collect();

    axes.sort_by(|a, b| {
        b.net_interest
            .abs()
            .cmp(&a.net_interest.abs())
            .then(a.date.cmp(&b.date))
            .then(a.metal.cmp(&b.metal))
    });
    axes
}

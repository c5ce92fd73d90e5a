//! Candidate match discovery
//!
//! Pairwise scan over live orders for offsetting interest on the same
//! metal: opposite-direction legs with overlapping date spans. This is
//! a heuristic for human judgment, not an optimal matcher, but any
//! pair of date-identical, lot-equal, opposite-direction legs is
//! guaranteed to surface, flagged as exact.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::metal::Metal;
use types::order::Order;
use types::spread::SpreadLeg;

/// One overlapping opposite-direction leg pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegOverlap {
    pub leg_a: SpreadLeg,
    pub leg_b: SpreadLeg,
    pub overlap_start: NaiveDate,
    pub overlap_end: NaiveDate,
    pub overlap_days: i64,
    /// Lots matchable across the pair (the smaller side).
    pub matchable_lots: u32,
    /// Same dates, same lots, opposite direction.
    pub exact: bool,
}

/// A pair of orders with offsetting interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub order_a: OrderId,
    pub order_b: OrderId,
    pub metal: Metal,
    /// Σ overlap_days × matchable_lots / 100 across overlapping legs.
    pub score: Decimal,
    /// True when every leg of one order exactly mirrors a leg of the other.
    pub exact: bool,
    pub overlaps: Vec<LegOverlap>,
}

/// Scan live orders for offsetting pairs, best score first.
pub fn compute_candidate_matches(orders: &[Order]) -> Vec<MatchCandidate> {
    let live: Vec<&Order> = orders.iter().filter(|order| order.is_live()).collect();
    let mut candidates = Vec::new();

    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            // A user cannot match against themselves, and metals must agree
            if a.submitted_by == b.submitted_by || a.metal != b.metal {
                continue;
            }
            if let Some(candidate) = pair_candidate(a, b) {
                candidates.push(candidate);
            }
        }
    }

    candidates.sort_by(|x, y| y.score.cmp(&x.score));
    candidates
}

fn pair_candidate(a: &Order, b: &Order) -> Option<MatchCandidate> {
    let mut overlaps = Vec::new();

    for leg_a in a.spread.legs() {
        for leg_b in b.spread.legs() {
            if leg_a.direction == leg_b.direction || !leg_a.overlaps(leg_b) {
                continue;
            }
            let overlap_start = leg_a.start_date.max(leg_b.start_date);
            let overlap_end = leg_a.end_date.min(leg_b.end_date);
            let overlap_days = (overlap_end - overlap_start).num_days() + 1;
            overlaps.push(LegOverlap {
                leg_a: *leg_a,
                leg_b: *leg_b,
                overlap_start,
                overlap_end,
                overlap_days,
                matchable_lots: leg_a.lots.min(leg_b.lots),
                exact: leg_a.start_date == leg_b.start_date
                    && leg_a.end_date == leg_b.end_date
                    && leg_a.lots == leg_b.lots,
            });
        }
    }

    if overlaps.is_empty() {
        return None;
    }

    let score = overlaps
        .iter()
        .map(|o| Decimal::from(o.overlap_days) * Decimal::from(o.matchable_lots))
        .sum::<Decimal>()
        / Decimal::from(100);

    // Exact only when every leg on both sides is mirrored
    let exact = overlaps.iter().filter(|o| o.exact).count() == a.spread.legs().len()
        && a.spread.legs().len() == b.spread.legs().len();

    Some(MatchCandidate {
        order_a: a.id,
        order_b: b.id,
        metal: a.metal,
        score,
        exact,
        overlaps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use types::ids::UserId;
    use types::spread::{Direction, Spread};

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn order(metal: Metal, legs: Vec<SpreadLeg>, user: &str) -> Order {
        Order::new(
            Spread::new(metal, legs).unwrap(),
            UserId::new(user),
            Decimal::ZERO,
            None,
            Utc::now(),
        )
    }

    fn mirrored_pair() -> (Order, Order) {
        let a = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(10), Direction::Borrow, 10),
                SpreadLeg::new(d(10), d(20), Direction::Lend, 10),
            ],
            "bushy",
        );
        let b = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(10), Direction::Lend, 10),
                SpreadLeg::new(d(10), d(20), Direction::Borrow, 10),
            ],
            "josh",
        );
        (a, b)
    }

    #[test]
    fn test_exact_mirror_is_found_and_flagged() {
        let (a, b) = mirrored_pair();
        let candidates = compute_candidate_matches(&[a.clone(), b.clone()]);
        assert_eq!(candidates.len(), 1);
        let candidate = &candidates[0];
        assert_eq!(candidate.order_a, a.id);
        assert_eq!(candidate.order_b, b.id);
        assert!(candidate.exact);
        assert_eq!(candidate.overlaps.len(), 2);
    }

    #[test]
    fn test_same_user_never_matched() {
        let (a, mut b) = mirrored_pair();
        b.submitted_by = UserId::new("bushy");
        assert!(compute_candidate_matches(&[a, b]).is_empty());
    }

    #[test]
    fn test_different_metals_never_matched() {
        let (a, b) = mirrored_pair();
        let mut other = b.clone();
        other.metal = Metal::Copper;
        other.spread = Spread::new(
            Metal::Copper,
            b.spread.legs().to_vec(),
        )
        .unwrap();
        assert!(compute_candidate_matches(&[a, other]).is_empty());
    }

    #[test]
    fn test_same_direction_does_not_match() {
        let (a, _) = mirrored_pair();
        let same = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(10), Direction::Borrow, 10),
                SpreadLeg::new(d(10), d(20), Direction::Lend, 10),
            ],
            "dorans",
        );
        // Borrow overlaps the other order's Lend leg only at the shared
        // boundary date; the exact-mirror pair is gone
        let candidates = compute_candidate_matches(&[a, same]);
        assert!(candidates.iter().all(|c| !c.exact));
    }

    #[test]
    fn test_partial_overlap_scored_not_exact() {
        let a = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(10), Direction::Borrow, 10),
                SpreadLeg::new(d(10), d(20), Direction::Lend, 10),
            ],
            "bushy",
        );
        let b = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(5), d(12), Direction::Lend, 4),
                SpreadLeg::new(d(12), d(25), Direction::Borrow, 4),
            ],
            "josh",
        );
        let candidates = compute_candidate_matches(&[a, b]);
        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].exact);
        assert!(candidates[0].score > Decimal::ZERO);
    }

    #[test]
    fn test_terminal_orders_skipped() {
        let (a, mut b) = mirrored_pair();
        b.status = types::order::OrderStatus::Accepted;
        assert!(compute_candidate_matches(&[a, b]).is_empty());
    }

    #[test]
    fn test_best_score_first() {
        let (a, b) = mirrored_pair();
        let c = order(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(3), Direction::Lend, 1),
                SpreadLeg::new(d(3), d(5), Direction::Borrow, 1),
            ],
            "dorans",
        );
        let candidates = compute_candidate_matches(&[a, b, c]);
        assert!(candidates.len() >= 2);
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}

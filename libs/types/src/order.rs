//! Order lifecycle types
//!
//! Orders are owned exclusively by the order store; every mutation goes
//! through the lifecycle service, never through direct field writes from
//! other processes. `version` is the optimistic-concurrency token: it
//! starts at 1 and increments on every committed transition.

use crate::ids::{OrderId, UserId};
use crate::metal::Metal;
use crate::spread::Spread;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
///
/// Reachable edges:
/// `Submitted → {Countered, Accepted, Rejected}` and
/// `Countered → {Accepted, Rejected, Expired}`.
/// No transition leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting a maker response (initial)
    Submitted,
    /// Maker proposed an alternative price
    Countered,
    /// Agreed at the requested or countered price (terminal)
    Accepted,
    /// Declined by either side (terminal)
    Rejected,
    /// Countered order swept without a trader response (terminal)
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Accepted | OrderStatus::Rejected | OrderStatus::Expired
        )
    }

    /// Whether `next` is reachable from this status.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Submitted, OrderStatus::Countered)
                | (OrderStatus::Submitted, OrderStatus::Accepted)
                | (OrderStatus::Submitted, OrderStatus::Rejected)
                | (OrderStatus::Countered, OrderStatus::Accepted)
                | (OrderStatus::Countered, OrderStatus::Rejected)
                | (OrderStatus::Countered, OrderStatus::Expired)
        )
    }
}

/// A maker's alternative price proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterProposal {
    pub price: Decimal,
    pub proposer: UserId,
    pub message: Option<String>,
    pub proposed_at: DateTime<Utc>,
}

/// An order: one submitted spread plus its full negotiation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned at creation, immutable.
    pub id: OrderId,
    pub metal: Metal,
    pub spread: Spread,
    pub submitted_by: UserId,
    /// Engine valuation at the moment of submission; the reference point
    /// for the loss-threshold rule.
    pub valuation_at_submission: Decimal,
    /// Present iff the trader pre-authorizes counters within this band.
    pub loss_threshold: Option<Decimal>,
    pub status: OrderStatus,
    /// Every counter proposal, in order.
    pub counter_history: Vec<CounterProposal>,
    /// Free-text maker note attached to the closing response, if any.
    pub maker_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Monotonic; incremented on every committed transition.
    pub version: u64,
}

impl Order {
    /// Create a freshly submitted order at version 1.
    pub fn new(
        spread: Spread,
        submitted_by: UserId,
        valuation_at_submission: Decimal,
        loss_threshold: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            metal: spread.metal,
            spread,
            submitted_by,
            valuation_at_submission,
            loss_threshold,
            status: OrderStatus::Submitted,
            counter_history: Vec::new(),
            maker_message: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// The standing counter price, if any.
    pub fn latest_counter(&self) -> Option<&CounterProposal> {
        self.counter_history.last()
    }

    /// Non-terminal orders contribute to axes and candidate matches.
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }
}

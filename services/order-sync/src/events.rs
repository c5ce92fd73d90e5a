//! Order lifecycle event payload
//!
//! Events carry the transition edge and resulting version only; payload
//! details (counter history, maker message) stay in the order store and
//! are fetched by the reconciler on its next poll.

use serde::{Deserialize, Serialize};
use types::ids::OrderId;
use types::order::OrderStatus;

/// Channel name carrying all order lifecycle events.
pub const ORDER_EVENTS_CHANNEL: &str = "order-events";

/// One committed order transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub order_id: OrderId,
    pub old_status: OrderStatus,
    pub new_status: OrderStatus,
    /// Version of the order after the transition committed.
    pub version: u64,
}

//! Order lifecycle state machine
//!
//! Coordinates valuation, the store, and the event bus. `submit` prices
//! the spread against the current curve before any row exists: a
//! spread the curve cannot cover is rejected without a trace in the
//! store. `propose` validates the requested edge against the status
//! graph and the counter-acceptance business rule, commits via the
//! store's compare-and-swap, then announces the transition on the bus.
//!
//! Store write and publish are not atomic as a pair: a process can
//! observe the row before the event arrives, or receive no event at
//! all. The reconciler's polling backstop covers both cases.

use crate::store::{CommitError, OrderStore, StoreError};
use chrono::{DateTime, Utc};
use order_sync::{EventBus, OrderEvent, ORDER_EVENTS_CHANNEL};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use types::errors::{TransitionError, ValuationError};
use types::ids::{OrderId, UserId};
use types::order::{CounterProposal, Order, OrderStatus};
use types::spread::Spread;
use valuation::{CurveStore, ValuationEngine};

/// A requested lifecycle transition with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionAction {
    /// Maker proposes an alternative price.
    Counter {
        price: Decimal,
        proposer: UserId,
        message: Option<String>,
    },
    /// Either side agrees at the standing price.
    Accept { by: UserId },
    /// Either side declines.
    Reject { by: UserId, message: Option<String> },
    /// Collaborator sweep closes a stale countered order.
    Expire,
}

impl TransitionAction {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            TransitionAction::Counter { .. } => OrderStatus::Countered,
            TransitionAction::Accept { .. } => OrderStatus::Accepted,
            TransitionAction::Reject { .. } => OrderStatus::Rejected,
            TransitionAction::Expire => OrderStatus::Expired,
        }
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<CommitError> for LifecycleError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Transition(e) => LifecycleError::Transition(e),
            CommitError::Storage(e) => LifecycleError::Storage(e),
        }
    }
}

/// The only writer of order state.
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    store: Arc<OrderStore>,
    curves: Arc<CurveStore>,
    engine: ValuationEngine,
    bus: EventBus,
}

impl OrderLifecycle {
    pub fn new(
        store: Arc<OrderStore>,
        curves: Arc<CurveStore>,
        engine: ValuationEngine,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            curves,
            engine,
            bus,
        }
    }

    /// Submit a new spread: value it, create the order at version 1,
    /// announce it.
    pub fn submit(
        &self,
        spread: Spread,
        submitted_by: UserId,
        loss_threshold: Option<Decimal>,
    ) -> Result<Order, SubmitError> {
        let now = Utc::now();
        let valuation = self.engine.value(&spread, &self.curves, now)?;
        let order = Order::new(spread, submitted_by, valuation.total, loss_threshold, now);
        self.store.insert(order.clone())?;

        tracing::info!(
            order_id = %order.id,
            metal = %order.metal,
            user = %order.submitted_by,
            total = %valuation.total,
            "order submitted"
        );
        // Creation is announced on the same channel as transitions so
        // other processes pick the order up without waiting for a poll.
        self.publish(OrderEvent {
            order_id: order.id,
            old_status: OrderStatus::Submitted,
            new_status: OrderStatus::Submitted,
            version: order.version,
        });
        Ok(order)
    }

    /// Propose a transition with the version the caller last read.
    pub fn propose(
        &self,
        order_id: OrderId,
        expected_version: u64,
        action: TransitionAction,
    ) -> Result<Order, LifecycleError> {
        let now = Utc::now();
        let updated = self.store.transition(order_id, expected_version, |current| {
            apply_action(current, &action, now)
        })?;

        tracing::info!(
            %order_id,
            status = ?updated.status,
            version = updated.version,
            "order transitioned"
        );
        self.publish(OrderEvent {
            order_id,
            old_status: prior_status(&updated, &action),
            new_status: updated.status,
            version: updated.version,
        });
        Ok(updated)
    }

    /// Optional collaborator sweep: expire countered orders untouched
    /// since `cutoff`. The only path to terminal without a human action.
    pub fn expire_stale(&self, cutoff: DateTime<Utc>) -> Result<Vec<Order>, LifecycleError> {
        let mut expired = Vec::new();
        for order in self.store.live() {
            if order.status == OrderStatus::Countered && order.updated_at < cutoff {
                match self.propose(order.id, order.version, TransitionAction::Expire) {
                    Ok(updated) => expired.push(updated),
                    // Someone acted on it between the read and the sweep
                    Err(LifecycleError::Transition(err)) if err.is_retryable() => continue,
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(expired)
    }

    fn publish(&self, event: OrderEvent) {
        // Best effort: zero receivers is normal, and a missed event is
        // repaired by the reconciler's next poll.
        let receivers = self.bus.publish(ORDER_EVENTS_CHANNEL, event);
        tracing::debug!(order_id = %event.order_id, receivers, "event published");
    }
}

fn prior_status(updated: &Order, action: &TransitionAction) -> OrderStatus {
    // The commit already moved the row; reconstruct the edge's origin.
    // A counter only ever commits from Submitted (re-countering is not
    // a legal edge) and expiry only from Countered.
    match action {
        TransitionAction::Counter { .. } => OrderStatus::Submitted,
        TransitionAction::Expire => OrderStatus::Countered,
        _ if updated.counter_history.is_empty() => OrderStatus::Submitted,
        _ => OrderStatus::Countered,
    }
}

fn apply_action(
    current: &Order,
    action: &TransitionAction,
    now: DateTime<Utc>,
) -> Result<Order, TransitionError> {
    let target = action.target_status();
    if !current.status.can_transition_to(target) {
        return Err(TransitionError::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    let mut next = current.clone();
    match action {
        TransitionAction::Counter {
            price,
            proposer,
            message,
        } => {
            // Counters are only open to orders that carry a threshold
            if current.loss_threshold.is_none() {
                return Err(TransitionError::CountersNotAllowed {
                    order_id: current.id,
                });
            }
            next.counter_history.push(CounterProposal {
                price: *price,
                proposer: proposer.clone(),
                message: message.clone(),
                proposed_at: now,
            });
        }
        TransitionAction::Accept { .. } => {
            // Loss-threshold rule, evaluated at the point of response:
            // a counter may only be accepted within the pre-authorized
            // deviation from the submission valuation.
            if current.status == OrderStatus::Countered {
                let counter = current.latest_counter().ok_or(
                    TransitionError::NoCounterOnRecord {
                        order_id: current.id,
                    },
                )?;
                if let Some(threshold) = current.loss_threshold {
                    let deviation = (counter.price - current.valuation_at_submission).abs();
                    if deviation > threshold {
                        return Err(TransitionError::LossThresholdExceeded {
                            deviation,
                            threshold,
                        });
                    }
                }
            }
        }
        TransitionAction::Reject { message, .. } => {
            next.maker_message = message.clone();
        }
        TransitionAction::Expire => {}
    }

    next.status = target;
    next.version += 1;
    next.updated_at = now;
    Ok(next)
}

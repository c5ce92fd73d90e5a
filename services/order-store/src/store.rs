//! Order store: journal-backed source of truth
//!
//! In-memory map of orders rebuilt from the journal on open. Writes are
//! row-level compare-and-swap: a transition must present the version it
//! read, and a mismatch is a `Conflict` the caller retries or abandons.
//! The journal append happens before the map is touched, so a storage
//! failure leaves previously committed state intact.

use crate::journal::{Journal, JournalError};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use types::errors::TransitionError;
use types::ids::{OrderId, UserId};
use types::metal::Metal;
use types::order::{Order, OrderStatus};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Codec error: {0}")]
    Codec(String),
}

/// Filter for order listings; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub user: Option<UserId>,
    pub metal: Option<Metal>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        self.user
            .as_ref()
            .map_or(true, |user| &order.submitted_by == user)
            && self.metal.map_or(true, |metal| order.metal == metal)
            && self.status.map_or(true, |status| order.status == status)
    }
}

#[derive(Debug)]
struct Inner {
    orders: HashMap<OrderId, Order>,
    journal: Option<Journal>,
}

/// Durable, queryable record of every order.
#[derive(Debug)]
pub struct OrderStore {
    inner: Mutex<Inner>,
}

impl OrderStore {
    /// Open a store backed by a journal file, replaying prior state.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let (journal, records) = Journal::open(path)?;
        let mut orders = HashMap::new();
        for record in records {
            let order: Order = bincode::deserialize(&record.payload)
                .map_err(|e| StoreError::Codec(e.to_string()))?;
            // Later records supersede earlier ones for the same order
            orders.insert(order.id, order);
        }
        tracing::info!(count = orders.len(), "order store recovered from journal");
        Ok(Self {
            inner: Mutex::new(Inner {
                orders,
                journal: Some(journal),
            }),
        })
    }

    /// In-memory store with no journal; state dies with the process.
    pub fn ephemeral() -> Self {
        Self {
            inner: Mutex::new(Inner {
                orders: HashMap::new(),
                journal: None,
            }),
        }
    }

    /// Persist a freshly created order.
    pub fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("order store lock poisoned");
        Self::persist(&mut inner, &order)?;
        inner.orders.insert(order.id, order);
        Ok(())
    }

    /// Fetch one order.
    pub fn get(&self, id: OrderId) -> Option<Order> {
        let inner = self.inner.lock().expect("order store lock poisoned");
        inner.orders.get(&id).cloned()
    }

    /// List orders matching a filter, in chronological (id) order.
    pub fn list(&self, filter: &OrderFilter) -> Vec<Order> {
        let inner = self.inner.lock().expect("order store lock poisoned");
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        orders
    }

    /// All non-terminal orders.
    pub fn live(&self) -> Vec<Order> {
        let inner = self.inner.lock().expect("order store lock poisoned");
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.is_live())
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.id);
        orders
    }

    /// Compare-and-swap transition commit.
    ///
    /// Holds the row lock across read, validate, and write: exactly one
    /// of two racing writers with the same `expected_version` commits;
    /// the other gets `Conflict`. `apply` receives the current row and
    /// returns the fully transitioned replacement (with version already
    /// incremented) or a transition error.
    pub fn transition<F>(
        &self,
        id: OrderId,
        expected_version: u64,
        apply: F,
    ) -> Result<Order, CommitError>
    where
        F: FnOnce(&Order) -> Result<Order, TransitionError>,
    {
        let mut inner = self.inner.lock().expect("order store lock poisoned");
        let current = inner
            .orders
            .get(&id)
            .ok_or(TransitionError::NotFound { order_id: id })?;

        if current.version != expected_version {
            return Err(TransitionError::Conflict {
                order_id: id,
                expected: expected_version,
                actual: current.version,
            }
            .into());
        }

        let next = apply(current)?;
        debug_assert_eq!(next.id, id);
        debug_assert_eq!(next.version, expected_version + 1);

        Self::persist(&mut inner, &next)?;
        inner.orders.insert(id, next.clone());
        Ok(next)
    }

    fn persist(inner: &mut Inner, order: &Order) -> Result<(), StoreError> {
        if let Some(journal) = inner.journal.as_mut() {
            let payload =
                bincode::serialize(order).map_err(|e| StoreError::Codec(e.to_string()))?;
            journal.append(Utc::now().timestamp_micros(), payload)?;
        }
        Ok(())
    }
}

/// Outcome of a transition commit: a domain-level transition error
/// (including the expected `Conflict`) or a fatal storage failure.
#[derive(Error, Debug)]
pub enum CommitError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl order_sync::OrderAuthority for OrderStore {
    type Error = StoreError;

    fn load(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.get(id))
    }

    fn load_all(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.list(&OrderFilter::default()))
    }
}

//! Sync reconciler
//!
//! Every consuming process keeps a read-optimized local cache of orders.
//! Bus events are the fast path: an event whose version is exactly one
//! ahead of the cached row is applied in place; anything else marks the
//! row dirty. The slow path, `poll` on an interval with `resync` as the
//! full safety net, re-reads the authority and overwrites the cache,
//! so a dropped event can delay convergence but never prevent it.

use crate::events::OrderEvent;
use std::collections::{HashMap, HashSet};
use types::ids::OrderId;
use types::order::{Order, OrderStatus};

/// Authoritative source of order rows (the order store).
///
/// The reconciler only ever overwrites its cache with what the authority
/// returns; the cache is never authoritative.
pub trait OrderAuthority {
    type Error: std::error::Error;

    fn load(&self, id: OrderId) -> Result<Option<Order>, Self::Error>;
    fn load_all(&self) -> Result<Vec<Order>, Self::Error>;
}

impl<A: OrderAuthority> OrderAuthority for std::sync::Arc<A> {
    type Error = A::Error;

    fn load(&self, id: OrderId) -> Result<Option<Order>, Self::Error> {
        self.as_ref().load(id)
    }

    fn load_all(&self) -> Result<Vec<Order>, Self::Error> {
        self.as_ref().load_all()
    }
}

/// Per-process order cache with event fast path and polling backstop.
#[derive(Debug)]
pub struct SyncReconciler<A: OrderAuthority> {
    authority: A,
    cache: HashMap<OrderId, Order>,
    dirty: HashSet<OrderId>,
}

impl<A: OrderAuthority> SyncReconciler<A> {
    pub fn new(authority: A) -> Self {
        Self {
            authority,
            cache: HashMap::new(),
            dirty: HashSet::new(),
        }
    }

    /// Cached view of one order.
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.cache.get(&id)
    }

    /// All cached orders.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.cache.values()
    }

    /// Rows awaiting a re-read.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Fast path: fold a bus event into the cache.
    ///
    /// Applies only the exact next version; stale, skipped, or unknown
    /// versions mark the row dirty for the next poll. Counter events
    /// carry payload (the proposal itself) that the event doesn't, so
    /// those rows are re-read even when the version lines up.
    pub fn apply_event(&mut self, event: &OrderEvent) {
        match self.cache.get_mut(&event.order_id) {
            Some(cached)
                if event.version == cached.version + 1 && cached.status == event.old_status =>
            {
                cached.status = event.new_status;
                cached.version = event.version;
                if event.new_status == OrderStatus::Countered {
                    self.dirty.insert(event.order_id);
                }
            }
            _ => {
                self.dirty.insert(event.order_id);
            }
        }
    }

    /// After a `Lagged` bus signal: everything cached is suspect.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.extend(self.cache.keys().copied());
    }

    /// Slow path: re-read dirty rows from the authority.
    /// Returns how many rows were refreshed.
    ///
    /// A row's dirty mark is cleared only once its re-read succeeds, so
    /// an authority failure mid-poll leaves the remaining rows queued
    /// for the next attempt.
    pub fn poll(&mut self) -> Result<usize, A::Error> {
        let ids: Vec<OrderId> = self.dirty.iter().copied().collect();
        let mut refreshed = 0;
        for id in ids {
            match self.authority.load(id)? {
                Some(order) => {
                    self.cache.insert(id, order);
                    refreshed += 1;
                }
                None => {
                    self.cache.remove(&id);
                }
            }
            self.dirty.remove(&id);
        }
        Ok(refreshed)
    }

    /// Full safety net: replace the whole cache from the authority.
    pub fn resync(&mut self) -> Result<usize, A::Error> {
        let all = self.authority.load_all()?;
        let count = all.len();
        self.cache = all.into_iter().map(|order| (order.id, order)).collect();
        self.dirty.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};
    use types::ids::UserId;
    use types::metal::Metal;
    use types::spread::{Direction, Spread, SpreadLeg};

    /// In-memory stand-in for the order store.
    #[derive(Debug, Clone, Default)]
    struct FakeAuthority {
        rows: Arc<Mutex<HashMap<OrderId, Order>>>,
    }

    impl FakeAuthority {
        fn upsert(&self, order: Order) {
            self.rows.lock().unwrap().insert(order.id, order);
        }
    }

    impl OrderAuthority for FakeAuthority {
        type Error = Infallible;

        fn load(&self, id: OrderId) -> Result<Option<Order>, Infallible> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        fn load_all(&self) -> Result<Vec<Order>, Infallible> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("authority unavailable")]
    struct Unavailable;

    /// Authority whose next load can be made to fail.
    #[derive(Debug, Clone, Default)]
    struct FlakyAuthority {
        inner: FakeAuthority,
        fail_next: Arc<Mutex<bool>>,
    }

    impl FlakyAuthority {
        fn fail_once(&self) {
            *self.fail_next.lock().unwrap() = true;
        }
    }

    impl OrderAuthority for FlakyAuthority {
        type Error = Unavailable;

        fn load(&self, id: OrderId) -> Result<Option<Order>, Unavailable> {
            if std::mem::take(&mut *self.fail_next.lock().unwrap()) {
                return Err(Unavailable);
            }
            Ok(self.inner.load(id).unwrap())
        }

        fn load_all(&self) -> Result<Vec<Order>, Unavailable> {
            Ok(self.inner.load_all().unwrap())
        }
    }

    fn sample_order() -> Order {
        let d = |day| chrono::NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let spread = Spread::new(
            Metal::Zinc,
            vec![
                SpreadLeg::new(d(1), d(10), Direction::Borrow, 5),
                SpreadLeg::new(d(10), d(20), Direction::Lend, 5),
            ],
        )
        .unwrap();
        Order::new(
            spread,
            UserId::new("josh"),
            Decimal::from(-200),
            None,
            chrono::Utc::now(),
        )
    }

    fn event(order: &Order, new_status: OrderStatus) -> OrderEvent {
        OrderEvent {
            order_id: order.id,
            old_status: order.status,
            new_status,
            version: order.version + 1,
        }
    }

    #[test]
    fn test_fast_path_applies_next_version() {
        let authority = FakeAuthority::default();
        let order = sample_order();
        authority.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority);
        reconciler.resync().unwrap();

        reconciler.apply_event(&event(&order, OrderStatus::Accepted));
        let cached = reconciler.get(order.id).unwrap();
        assert_eq!(cached.status, OrderStatus::Accepted);
        assert_eq!(cached.version, 2);
        assert_eq!(reconciler.dirty_count(), 0);
    }

    #[test]
    fn test_counter_event_still_marks_dirty() {
        let authority = FakeAuthority::default();
        let order = sample_order();
        authority.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority);
        reconciler.resync().unwrap();

        reconciler.apply_event(&event(&order, OrderStatus::Countered));
        // Status applied, but the proposal payload needs a re-read
        assert_eq!(
            reconciler.get(order.id).unwrap().status,
            OrderStatus::Countered
        );
        assert_eq!(reconciler.dirty_count(), 1);
    }

    #[test]
    fn test_version_gap_marks_dirty_and_poll_repairs() {
        let authority = FakeAuthority::default();
        let order = sample_order();
        authority.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority.clone());
        reconciler.resync().unwrap();

        // Authority has moved two steps ahead; we only saw the second event
        let mut advanced = order.clone();
        advanced.status = OrderStatus::Accepted;
        advanced.version = 3;
        authority.upsert(advanced.clone());

        reconciler.apply_event(&OrderEvent {
            order_id: order.id,
            old_status: OrderStatus::Countered,
            new_status: OrderStatus::Accepted,
            version: 3,
        });
        // Not applied in place: cached row is still v1, just dirty
        assert_eq!(reconciler.get(order.id).unwrap().version, 1);
        assert_eq!(reconciler.dirty_count(), 1);

        assert_eq!(reconciler.poll().unwrap(), 1);
        assert_eq!(reconciler.get(order.id).unwrap(), &advanced);
    }

    #[test]
    fn test_unknown_order_discovered_on_poll() {
        let authority = FakeAuthority::default();
        let order = sample_order();
        authority.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority);
        reconciler.apply_event(&event(&order, OrderStatus::Countered));
        assert!(reconciler.get(order.id).is_none());

        reconciler.poll().unwrap();
        assert!(reconciler.get(order.id).is_some());
    }

    #[test]
    fn test_poll_failure_keeps_dirty_marks() {
        let authority = FlakyAuthority::default();
        let order = sample_order();
        authority.inner.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority.clone());
        reconciler.apply_event(&event(&order, OrderStatus::Countered));
        assert_eq!(reconciler.dirty_count(), 1);

        // The authority is down for this poll; nothing is refreshed and
        // the row stays queued rather than being silently forgotten
        authority.fail_once();
        assert!(reconciler.poll().is_err());
        assert_eq!(reconciler.dirty_count(), 1);

        // The next poll picks the same row up and converges
        assert_eq!(reconciler.poll().unwrap(), 1);
        assert_eq!(reconciler.dirty_count(), 0);
        assert_eq!(reconciler.get(order.id).unwrap(), &order);
    }

    #[test]
    fn test_resync_overwrites_divergent_cache() {
        let authority = FakeAuthority::default();
        let order = sample_order();
        authority.upsert(order.clone());

        let mut reconciler = SyncReconciler::new(authority.clone());
        reconciler.resync().unwrap();

        // Authority advances; no event is ever delivered (dropped)
        let mut accepted = order.clone();
        accepted.status = OrderStatus::Accepted;
        accepted.version = 2;
        authority.upsert(accepted.clone());

        reconciler.resync().unwrap();
        assert_eq!(reconciler.get(order.id).unwrap(), &accepted);
    }
}

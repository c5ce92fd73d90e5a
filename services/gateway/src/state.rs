use matching::PositionStore;
use order_store::{OrderLifecycle, OrderStore};
use order_sync::EventBus;
use std::sync::Arc;
use valuation::{CurveConvention, CurveStore, ValuationEngine};

/// Shared application state, cloned per request.
///
/// All four presentation processes talk to one gateway, so this is the
/// single place where the stores, the lifecycle writer, and the bus are
/// wired together.
#[derive(Clone)]
pub struct AppState {
    pub curves: Arc<CurveStore>,
    pub orders: Arc<OrderStore>,
    pub positions: Arc<PositionStore>,
    pub lifecycle: OrderLifecycle,
    pub engine: ValuationEngine,
    pub bus: EventBus,
}

impl AppState {
    pub fn new(orders: Arc<OrderStore>) -> Self {
        let curves = Arc::new(CurveStore::new());
        let engine = ValuationEngine::new(CurveConvention::default());
        let bus = EventBus::new();
        let lifecycle = OrderLifecycle::new(
            Arc::clone(&orders),
            Arc::clone(&curves),
            engine,
            bus.clone(),
        );
        Self {
            curves,
            orders,
            positions: Arc::new(PositionStore::new()),
            lifecycle,
            engine,
            bus,
        }
    }
}

//! Order event bus and sync reconciler
//!
//! The bus is a best-effort latency optimization: delivery is
//! fire-and-forget, a subscription only sees events published after it
//! begins, and nothing here is durable. Correctness never depends on the
//! bus: every consuming process runs a `SyncReconciler` whose periodic
//! re-read of the order authority is the backstop for any dropped event.

pub mod bus;
pub mod events;
pub mod reconciler;

pub use bus::{BusError, EventBus, Subscription};
pub use events::{OrderEvent, ORDER_EVENTS_CHANNEL};
pub use reconciler::{OrderAuthority, SyncReconciler};

//! Durable order store and lifecycle state machine
//!
//! The store is the single source of truth for every order: an in-memory
//! map backed by an append-only, checksummed journal, rebuilt on open by
//! replaying the journal. All writes are row-level compare-and-swap on
//! the order's version; the lifecycle service layers the transition
//! state machine and business rules on top and announces every committed
//! transition on the event bus.

pub mod journal;
pub mod lifecycle;
pub mod store;

pub use journal::{Journal, JournalError, JournalRecord};
pub use lifecycle::{LifecycleError, OrderLifecycle, SubmitError, TransitionAction};
pub use store::{CommitError, OrderFilter, OrderStore, StoreError};

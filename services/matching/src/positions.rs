//! Maker position store
//!
//! Replace-on-upload: a new CSV ingest swaps the whole set atomically,
//! so a reader never observes half of an upload. Rows are not
//! versioned; the latest upload simply wins.

use std::sync::{Arc, RwLock};
use types::metal::Metal;
use types::position::Position;

/// Shared, atomically replaceable position set.
#[derive(Debug, Default)]
pub struct PositionStore {
    positions: RwLock<Arc<Vec<Position>>>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire position set.
    pub fn replace(&self, positions: Vec<Position>) {
        let count = positions.len();
        *self.positions.write().expect("position store lock poisoned") = Arc::new(positions);
        tracing::info!(count, "positions replaced");
    }

    /// Snapshot of the current set.
    pub fn all(&self) -> Arc<Vec<Position>> {
        self.positions.read().expect("position store lock poisoned").clone()
    }

    /// Rows for one metal.
    pub fn for_metal(&self, metal: Metal) -> Vec<Position> {
        self.all()
            .iter()
            .filter(|pos| pos.metal == metal)
            .copied()
            .collect()
    }
}

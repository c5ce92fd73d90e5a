//! Matching aggregator
//!
//! Turns live orders and maker positions into derived market views:
//! netted per-metal/per-date interest ("axes") for the dashboard
//! heatmap, candidate match pairs for human judgment, and the estimated
//! position impact of accepting an order. Everything here is recomputed
//! on demand from store snapshots and never persisted.

pub mod axes;
pub mod candidates;
pub mod impact;
pub mod positions;

pub use axes::{compute_axes, MarketAxis};
pub use candidates::{compute_candidate_matches, LegOverlap, MatchCandidate};
pub use impact::{position_impact, PositionDelta};
pub use positions::PositionStore;

//! Curve store and spread valuation
//!
//! Holds one published forward curve per metal and prices multi-leg
//! spreads against a consistent curve snapshot. Valuation is a pure
//! function of (spread, curve snapshot, as-of time): no side effects,
//! deterministic, safe to call concurrently and repeatedly.

pub mod engine;
pub mod store;

pub use engine::{CurveConvention, LegValuation, SpreadValuation, ValuationEngine};
pub use store::CurveStore;

//! Types library for the spread trading engine
//!
//! This library provides all core type definitions shared across the
//! engine's services: forward curves, spreads, orders, positions, and the
//! error taxonomy. Services never define their own copies of these
//! entities; all cross-process payloads are built from this crate.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, UserId)
//! - `metal`: LME metal universe and contract lot sizes
//! - `curve`: Forward curve model
//! - `spread`: Spread legs and validated spreads
//! - `order`: Order lifecycle types
//! - `position`: Maker position rows
//! - `errors`: Error taxonomy

pub mod curve;
pub mod errors;
pub mod ids;
pub mod metal;
pub mod order;
pub mod position;
pub mod spread;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::curve::*;
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::metal::*;
    pub use crate::order::*;
    pub use crate::position::*;
    pub use crate::spread::*;
}

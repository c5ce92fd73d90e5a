//! Maker position rows
//!
//! Flat, replace-on-upload exposure records: one signed lot figure per
//! (metal, date). Not versioned: a new upload swaps the whole set.

use crate::metal::Metal;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One maker exposure row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub metal: Metal,
    pub date: NaiveDate,
    /// Signed lots; positive is borrowed exposure under the engine's
    /// Borrow-positive convention.
    pub lots: Decimal,
}

impl Position {
    pub fn new(metal: Metal, date: NaiveDate, lots: Decimal) -> Self {
        Self { metal, date, lots }
    }
}

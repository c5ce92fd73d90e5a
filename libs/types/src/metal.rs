//! LME metal universe
//!
//! The engine trades the six primary LME base metals. Contract lot sizes
//! are fixed per metal and feed directly into valuation and axis scaling.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The traded metal universe (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metal {
    Aluminum,
    Copper,
    Lead,
    Zinc,
    Nickel,
    Tin,
}

impl Metal {
    /// All metals, in display order.
    pub const ALL: [Metal; 6] = [
        Metal::Aluminum,
        Metal::Copper,
        Metal::Lead,
        Metal::Zinc,
        Metal::Nickel,
        Metal::Tin,
    ];

    /// Contract lot size in tonnes.
    ///
    /// LME lot sizes: 25t for aluminum, copper, lead, and zinc; 6t for
    /// nickel; 5t for tin.
    pub fn tonnes_per_lot(&self) -> Decimal {
        match self {
            Metal::Aluminum | Metal::Copper | Metal::Lead | Metal::Zinc => Decimal::from(25),
            Metal::Nickel => Decimal::from(6),
            Metal::Tin => Decimal::from(5),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Aluminum => "Aluminum",
            Metal::Copper => "Copper",
            Metal::Lead => "Lead",
            Metal::Zinc => "Zinc",
            Metal::Nickel => "Nickel",
            Metal::Tin => "Tin",
        }
    }
}

impl fmt::Display for Metal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown metal name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown metal: {0}")]
pub struct UnknownMetal(pub String);

impl FromStr for Metal {
    type Err = UnknownMetal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aluminum" | "aluminium" => Ok(Metal::Aluminum),
            "copper" => Ok(Metal::Copper),
            "lead" => Ok(Metal::Lead),
            "zinc" => Ok(Metal::Zinc),
            "nickel" => Ok(Metal::Nickel),
            "tin" => Ok(Metal::Tin),
            other => Err(UnknownMetal(other.to_string())),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product categories the engine knows how to price
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Supplement,
    Device,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Supplement => "supplement",
            Category::Device => "device",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supplement" => Ok(Category::Supplement),
            "device" => Ok(Category::Device),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}

/// Cost and price figures returned for a single quote.
///
/// Every field is already rounded: `base_cost` to 2 places, `margin` to 1
/// place, the rest to whole units.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceBreakdown {
    pub base_cost: f64,
    pub total_cost: f64,
    pub final_price: f64,
    pub profit: f64,
    /// Percentage of the final price kept as profit
    pub margin: f64,
}

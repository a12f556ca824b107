use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::analysis::constants::{INCLUSION_TOLERANCE_PCT, KG_PER_TON_PER_PCT, PERCENT_BASE};
use crate::error::FeedError;
use crate::models::Ingredient;

/// How inclusion rates are entered and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InclusionMode {
    #[default]
    #[serde(rename = "percent")]
    Percent,
    #[serde(rename = "kg_per_ton")]
    KgPerTon,
}

impl InclusionMode {
    pub fn unit(self) -> &'static str {
        match self {
            InclusionMode::Percent => "%",
            InclusionMode::KgPerTon => "kg/ton",
        }
    }

    /// Inclusion percentage expressed in this mode.
    pub fn to_display(self, inclusion_pct: f64) -> f64 {
        match self {
            InclusionMode::Percent => inclusion_pct,
            InclusionMode::KgPerTon => inclusion_pct * KG_PER_TON_PER_PCT,
        }
    }

    /// Value entered in this mode back to a percentage.
    pub fn from_display(self, value: f64) -> f64 {
        match self {
            InclusionMode::Percent => value,
            InclusionMode::KgPerTon => value / KG_PER_TON_PER_PCT,
        }
    }
}

impl fmt::Display for InclusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InclusionMode::Percent => f.write_str("percent"),
            InclusionMode::KgPerTon => f.write_str("kg_per_ton"),
        }
    }
}

impl FromStr for InclusionMode {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "percent" | "%" | "pct" => Ok(InclusionMode::Percent),
            "kg_per_ton" | "kg/ton" | "kg" => Ok(InclusionMode::KgPerTon),
            other => Err(FeedError::InvalidInput(format!(
                "unknown inclusion mode '{}'",
                other
            ))),
        }
    }
}

/// Whether a mix's total inclusion is far enough from 100 % to warn about.
pub fn needs_normalization(total_inclusion: f64) -> bool {
    (PERCENT_BASE - total_inclusion).abs() > INCLUSION_TOLERANCE_PCT
}

/// Scale every inclusion so the mix sums to 100 %.
///
/// A mix with zero (or negative) total is returned unchanged.
pub fn normalize_inclusions(ingredients: &[Ingredient]) -> Vec<Ingredient> {
    let total: f64 = ingredients.iter().map(|i| i.inclusion_pct).sum();
    if !(total > 0.0) {
        return ingredients.to_vec();
    }

    let factor = PERCENT_BASE / total;
    ingredients
        .iter()
        .map(|ingredient| {
            let mut scaled = ingredient.clone();
            scaled.inclusion_pct *= factor;
            scaled
        })
        .collect()
}

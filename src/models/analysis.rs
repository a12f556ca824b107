use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::models::ingredient::{Ingredient, Nutrient};

/// Indices computed from the blended (post-enzyme) profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DerivedIndex {
    MeCpRatio,
    CaAvPRatio,
    KClNaRatio,
    ElectrolyteBalance,
}

impl DerivedIndex {
    pub const ALL: [DerivedIndex; 4] = [
        DerivedIndex::MeCpRatio,
        DerivedIndex::CaAvPRatio,
        DerivedIndex::KClNaRatio,
        DerivedIndex::ElectrolyteBalance,
    ];

    pub fn key(self) -> &'static str {
        match self {
            DerivedIndex::MeCpRatio => "MECP_Ratio",
            DerivedIndex::CaAvPRatio => "CaAvP_Ratio",
            DerivedIndex::KClNaRatio => "K_Cl_Na_Ratio",
            DerivedIndex::ElectrolyteBalance => "dEB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DerivedIndex::MeCpRatio => "ME/CP Ratio",
            DerivedIndex::CaAvPRatio => "Ca/Av. P Ratio",
            DerivedIndex::KClNaRatio => "(K+Cl)/Na",
            DerivedIndex::ElectrolyteBalance => "dEB (mEq/kg)",
        }
    }

    pub fn base_unit(self) -> &'static str {
        match self {
            DerivedIndex::ElectrolyteBalance => "mEq/kg",
            _ => "",
        }
    }
}

/// A key of the analysis `nutrients` map: an intrinsic nutrient or a derived index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Metric {
    Nutrient(Nutrient),
    Derived(DerivedIndex),
}

impl Metric {
    /// All metrics, nutrients first, in display order.
    pub fn all() -> impl Iterator<Item = Metric> {
        Nutrient::ALL
            .into_iter()
            .map(Metric::Nutrient)
            .chain(DerivedIndex::ALL.into_iter().map(Metric::Derived))
    }

    pub fn key(self) -> &'static str {
        match self {
            Metric::Nutrient(n) => n.key(),
            Metric::Derived(d) => d.key(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Nutrient(n) => n.label(),
            Metric::Derived(d) => d.label(),
        }
    }

    pub fn base_unit(self) -> &'static str {
        match self {
            Metric::Nutrient(n) => n.base_unit(),
            Metric::Derived(d) => d.base_unit(),
        }
    }
}

impl From<Nutrient> for Metric {
    fn from(value: Nutrient) -> Self {
        Metric::Nutrient(value)
    }
}

impl From<DerivedIndex> for Metric {
    fn from(value: DerivedIndex) -> Self {
        Metric::Derived(value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::all()
            .find(|m| m.key() == s)
            .ok_or_else(|| FeedError::UnknownNutrient(s.to_string()))
    }
}

impl TryFrom<String> for Metric {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Metric> for &'static str {
    fn from(value: Metric) -> Self {
        value.key()
    }
}

/// Nutrient uplift recorded for one enzyme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeContribution {
    pub name: String,
    pub contributions: BTreeMap<Nutrient, f64>,
}

/// Result of analyzing a feed mix. Built fresh on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedAnalysis {
    /// Sum of all inclusion rates; not normalized.
    pub total_inclusion: f64,
    pub total_cost_per_ton: f64,
    #[serde(rename = "totalCostPer100kg")]
    pub total_cost_per_100kg: f64,
    pub nutrients: BTreeMap<Metric, f64>,
    pub enzyme_contributions: BTreeMap<u64, EnzymeContribution>,
    /// The input list, unmodified.
    pub ingredients: Vec<Ingredient>,
}

impl FeedAnalysis {
    /// The result for an empty ingredient list.
    pub fn empty() -> Self {
        Self {
            total_inclusion: 0.0,
            total_cost_per_ton: 0.0,
            total_cost_per_100kg: 0.0,
            nutrients: BTreeMap::new(),
            enzyme_contributions: BTreeMap::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.nutrients.get(&metric).copied()
    }

    pub fn nutrient(&self, nutrient: Nutrient) -> Option<f64> {
        self.metric(Metric::Nutrient(nutrient))
    }

    pub fn derived(&self, index: DerivedIndex) -> Option<f64> {
        self.metric(Metric::Derived(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys_parse() {
        for metric in Metric::all() {
            assert_eq!(metric.key().parse::<Metric>().unwrap(), metric);
        }
        assert_eq!(Metric::all().count(), Nutrient::COUNT + 4);
    }

    #[test]
    fn test_nutrients_before_derived() {
        let last_nutrient = Metric::Nutrient(Nutrient::Choline);
        assert!(last_nutrient < Metric::Derived(DerivedIndex::MeCpRatio));
    }

    #[test]
    fn test_empty_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(FeedAnalysis::empty()).unwrap();
        assert_eq!(value["totalInclusion"], 0.0);
        assert_eq!(value["totalCostPer100kg"], 0.0);
        assert!(value["nutrients"].as_object().unwrap().is_empty());
        assert!(value["enzymeContributions"].as_object().unwrap().is_empty());
    }
}

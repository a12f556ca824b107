//! Display-unit conversion for report values.
//!
//! Engine values are always in base units; conversion only changes how a
//! value is shown.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::models::{DerivedIndex, Metric, Nutrient};

/// A value shown in an analysis report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReportField {
    CostPerTon,
    CostPer100kg,
    Metric(Metric),
}

impl ReportField {
    /// Every report field in display order.
    pub fn all() -> impl Iterator<Item = ReportField> {
        [ReportField::CostPerTon, ReportField::CostPer100kg]
            .into_iter()
            .chain(Metric::all().map(ReportField::Metric))
    }

    pub fn key(self) -> String {
        match self {
            ReportField::CostPerTon => "totalCostPerTon".to_string(),
            ReportField::CostPer100kg => "totalCostPer100kg".to_string(),
            ReportField::Metric(metric) => format!("nutrients.{}", metric.key()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportField::CostPerTon => "Total Feed Cost",
            ReportField::CostPer100kg => "Total Feed Cost (100 kg)",
            ReportField::Metric(metric) => metric.label(),
        }
    }
}

impl From<Metric> for ReportField {
    fn from(value: Metric) -> Self {
        ReportField::Metric(value)
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for ReportField {
    type Err = FeedError;

    /// Accepts `totalCostPerTon`, `totalCostPer100kg`, `nutrients.<key>` or a bare metric key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "totalCostPerTon" => Ok(ReportField::CostPerTon),
            "totalCostPer100kg" => Ok(ReportField::CostPer100kg),
            other => other
                .strip_prefix("nutrients.")
                .unwrap_or(other)
                .parse::<Metric>()
                .map(ReportField::Metric)
                .map_err(|_| FeedError::UnknownField(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReportField {
    type Error = FeedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportField> for String {
    fn from(value: ReportField) -> Self {
        value.key()
    }
}

type UnitTable = &'static [(&'static str, f64)];

const PERCENT: UnitTable = &[("%", 1.0), ("g/kg", 10.0)];
const ELECTROLYTE: UnitTable = &[("%", 1.0), ("g/kg", 10.0), ("ppm", 10_000.0)];
const ENERGY: UnitTable = &[("kcal/kg", 1.0), ("MJ/kg", 1.0 / 239.006)];
const CHOLINE: UnitTable = &[("mg/kg", 1.0), ("g/kg", 0.001), ("%", 0.0001), ("ppm", 1.0)];
const RATIO: UnitTable = &[("", 1.0)];
const DEB: UnitTable = &[("mEq/kg", 1.0)];
const COST_PER_TON: UnitTable = &[("$/ton", 1.0), ("$/kg", 0.001)];
const COST_PER_100KG: UnitTable = &[("$/100kg", 1.0), ("$/kg", 0.01)];

/// Conversion factors for a field; the first entry is the base unit.
fn unit_table(field: ReportField) -> UnitTable {
    match field {
        ReportField::CostPerTon => COST_PER_TON,
        ReportField::CostPer100kg => COST_PER_100KG,
        ReportField::Metric(Metric::Derived(DerivedIndex::ElectrolyteBalance)) => DEB,
        ReportField::Metric(Metric::Derived(_)) => RATIO,
        ReportField::Metric(Metric::Nutrient(nutrient)) => match nutrient {
            Nutrient::MetabolizableEnergy => ENERGY,
            Nutrient::Choline => CHOLINE,
            Nutrient::Sodium | Nutrient::Potassium | Nutrient::Chloride => ELECTROLYTE,
            _ => PERCENT,
        },
    }
}

pub fn base_unit(field: ReportField) -> &'static str {
    unit_table(field)[0].0
}

pub fn available_units(field: ReportField) -> Vec<&'static str> {
    unit_table(field).iter().map(|(unit, _)| *unit).collect()
}

pub fn is_valid_unit(field: ReportField, unit: &str) -> bool {
    unit_table(field).iter().any(|(u, _)| *u == unit)
}

/// A value expressed in a display unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Converted {
    pub value: f64,
    pub unit: &'static str,
}

/// Convert a base-unit value to `unit`; unknown units fall back to the base unit.
pub fn convert(value: f64, field: ReportField, unit: &str) -> Converted {
    let table = unit_table(field);
    match table.iter().find(|(u, _)| *u == unit) {
        Some(&(unit, factor)) => Converted {
            value: value * factor,
            unit,
        },
        None => Converted {
            value,
            unit: table[0].0,
        },
    }
}

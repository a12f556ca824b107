use std::collections::BTreeSet;
use std::fmt;

use crate::analysis::constants::RANGE_TOLERANCE;
use crate::models::{DerivedIndex, FeedAnalysis, Metric, Nutrient};
use crate::recommend::profile::{Recommendation, RecommendationProfile};

/// How a blended value sits against its recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    WithinRange,
    Borderline,
    OutOfRange,
    MeetsMinimum,
    SlightlyLow,
    BelowMinimum,
}

impl RangeStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, RangeStatus::WithinRange | RangeStatus::MeetsMinimum)
    }

    pub fn is_warning(self) -> bool {
        matches!(self, RangeStatus::Borderline | RangeStatus::SlightlyLow)
    }

    pub fn text(self) -> &'static str {
        match self {
            RangeStatus::WithinRange => "Within Range",
            RangeStatus::Borderline => "Borderline",
            RangeStatus::OutOfRange => "Out of Range",
            RangeStatus::MeetsMinimum => "Meets Minimum",
            RangeStatus::SlightlyLow => "Slightly Low",
            RangeStatus::BelowMinimum => "Below Minimum",
        }
    }
}

impl fmt::Display for RangeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Classify a value with the fixed 5 % tolerance band.
pub fn classify(value: f64, rec: &Recommendation) -> RangeStatus {
    let low_edge = rec.min * (1.0 - RANGE_TOLERANCE);

    let Some(max) = rec.max else {
        return if value >= rec.min {
            RangeStatus::MeetsMinimum
        } else if value >= low_edge {
            RangeStatus::SlightlyLow
        } else {
            RangeStatus::BelowMinimum
        };
    };

    if value >= rec.min && value <= max {
        RangeStatus::WithinRange
    } else if (value > max && value <= max * (1.0 + RANGE_TOLERANCE))
        || (value < rec.min && value >= low_edge)
    {
        RangeStatus::Borderline
    } else {
        RangeStatus::OutOfRange
    }
}

/// Distance from the range midpoint, or from the minimum for minimum-only targets.
pub fn deviation(value: f64, rec: &Recommendation) -> f64 {
    match rec.max {
        Some(max) => value - (rec.min + max) / 2.0,
        None => value - rec.min,
    }
}

/// Display groups for the comparison table, in order.
pub const NUTRIENT_GROUPS: [(&str, &[Metric]); 4] = [
    (
        "Key Performance",
        &[
            Metric::Nutrient(Nutrient::MetabolizableEnergy),
            Metric::Nutrient(Nutrient::CrudeProtein),
        ],
    ),
    (
        "Major Minerals",
        &[
            Metric::Nutrient(Nutrient::Calcium),
            Metric::Nutrient(Nutrient::AvailablePhosphorus),
            Metric::Derived(DerivedIndex::CaAvPRatio),
            Metric::Nutrient(Nutrient::Sodium),
            Metric::Nutrient(Nutrient::Ash),
        ],
    ),
    (
        "Essential Amino Acids",
        &[
            Metric::Nutrient(Nutrient::Lysine),
            Metric::Nutrient(Nutrient::MethionineCystine),
            Metric::Nutrient(Nutrient::Arginine),
            Metric::Nutrient(Nutrient::Threonine),
            Metric::Nutrient(Nutrient::Valine),
            Metric::Nutrient(Nutrient::Isoleucine),
        ],
    ),
    (
        "Other Nutrients",
        &[Metric::Nutrient(Nutrient::Choline)],
    ),
];

/// One row of a recommendation comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct NutrientComparison {
    pub group: &'static str,
    pub metric: Metric,
    pub value: f64,
    pub recommendation: Recommendation,
    pub deviation: f64,
    pub status: RangeStatus,
    pub overridden: bool,
}

/// Compare an analysis against a recommendation profile.
///
/// Rows follow [`NUTRIENT_GROUPS`]; metrics the profile has no target for
/// are skipped and metrics missing from the analysis count as 0.
pub fn compare(
    analysis: &FeedAnalysis,
    profile: &RecommendationProfile,
    overridden: &BTreeSet<Metric>,
) -> Vec<NutrientComparison> {
    let mut rows = Vec::new();

    for (group, metrics) in NUTRIENT_GROUPS {
        for metric in metrics {
            let Some(rec) = profile.get(metric) else {
                continue;
            };
            let value = analysis.metric(*metric).unwrap_or(0.0);
            rows.push(NutrientComparison {
                group,
                metric: *metric,
                value,
                recommendation: *rec,
                deviation: deviation(value, rec),
                status: classify(value, rec),
                overridden: overridden.contains(metric),
            });
        }
    }

    rows
}

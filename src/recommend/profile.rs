use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::{FeedError, Result};
use crate::models::{DerivedIndex, Metric, Nutrient};

/// Broiler growth phase a recommendation profile applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum GrowthPhase {
    /// 0-10 days.
    #[default]
    Starter,
    /// 11-24 days.
    Grower,
    /// 25-39 days.
    #[serde(rename = "Finisher 1")]
    Finisher1,
    /// 40 days onwards.
    #[serde(rename = "Finisher 2")]
    Finisher2,
}

impl GrowthPhase {
    pub const ALL: [GrowthPhase; 4] = [
        GrowthPhase::Starter,
        GrowthPhase::Grower,
        GrowthPhase::Finisher1,
        GrowthPhase::Finisher2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GrowthPhase::Starter => "Starter",
            GrowthPhase::Grower => "Grower",
            GrowthPhase::Finisher1 => "Finisher 1",
            GrowthPhase::Finisher2 => "Finisher 2",
        }
    }
}

impl fmt::Display for GrowthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GrowthPhase {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        GrowthPhase::ALL
            .into_iter()
            .find(|phase| phase.name().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| FeedError::InvalidInput(format!("unknown growth phase '{}'", s)))
    }
}

/// Target range for one metric. `max == None` means minimum-only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recommendation {
    pub min: f64,
    pub max: Option<f64>,
    pub unit: &'static str,
}

impl Recommendation {
    const fn range(min: f64, max: f64, unit: &'static str) -> Self {
        Self {
            min,
            max: Some(max),
            unit,
        }
    }

    const fn at_least(min: f64, unit: &'static str) -> Self {
        Self {
            min,
            max: None,
            unit,
        }
    }

    pub fn is_minimum_only(&self) -> bool {
        self.max.is_none()
    }
}

pub type RecommendationProfile = BTreeMap<Metric, Recommendation>;

/// User-edited bounds replacing a built-in recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationOverride {
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RecommendationOverride {
    /// Build an override, rejecting non-finite bounds and `min > max`.
    pub fn new(metric: Metric, min: f64, max: Option<f64>) -> Result<Self> {
        let invalid = |reason: &str| FeedError::InvalidOverride {
            field: metric.key().to_string(),
            reason: reason.to_string(),
        };

        if !min.is_finite() {
            return Err(invalid("minimum must be a finite number"));
        }
        if let Some(max) = max {
            if !max.is_finite() {
                return Err(invalid("maximum must be a finite number"));
            }
            if min > max {
                return Err(invalid("minimum is greater than maximum"));
            }
        }
        Ok(Self { min, max })
    }
}

pub type RecommendationOverrides = BTreeMap<Metric, RecommendationOverride>;

fn phase_profile(entries: [(Metric, Recommendation); 14]) -> RecommendationProfile {
    entries.into_iter().collect()
}

/// Ross 308 broiler targets per growth phase.
pub static ROSS_308_RECOMMENDATIONS: LazyLock<BTreeMap<GrowthPhase, RecommendationProfile>> =
    LazyLock::new(|| {
        use DerivedIndex::CaAvPRatio;
        use Nutrient::*;

        let me = Metric::Nutrient(MetabolizableEnergy);
        let n = Metric::Nutrient;
        let ca_avp = Metric::Derived(CaAvPRatio);
        let r = Recommendation::range;
        let min_only = Recommendation::at_least;

        let mut m = BTreeMap::new();
        m.insert(
            GrowthPhase::Starter,
            phase_profile([
                (me, r(2925.0, 3025.0, "kcal/kg")),
                (n(CrudeProtein), r(22.5, 23.5, "%")),
                (n(Lysine), r(1.32, 1.34, "%")),
                (n(MethionineCystine), r(1.00, 1.02, "%")),
                (n(Arginine), r(1.40, 1.42, "%")),
                (n(Threonine), r(0.88, 0.90, "%")),
                (n(Valine), r(1.00, 1.02, "%")),
                (n(Isoleucine), r(0.88, 0.90, "%")),
                (n(Calcium), r(0.93, 0.97, "%")),
                (n(AvailablePhosphorus), r(0.48, 0.52, "%")),
                (n(Sodium), r(0.18, 0.23, "%")),
                (n(Ash), r(5.0, 6.5, "%")),
                (n(Choline), min_only(1700.0, "mg/kg")),
                (ca_avp, r(1.8, 2.0, "")),
            ]),
        );
        m.insert(
            GrowthPhase::Grower,
            phase_profile([
                (me, r(3000.0, 3100.0, "kcal/kg")),
                (n(CrudeProtein), r(21.0, 22.0, "%")),
                (n(Lysine), r(1.18, 1.20, "%")),
                (n(MethionineCystine), r(0.92, 0.94, "%")),
                (n(Arginine), r(1.27, 1.29, "%")),
                (n(Threonine), r(0.79, 0.81, "%")),
                (n(Valine), r(0.91, 0.93, "%")),
                (n(Isoleucine), r(0.80, 0.82, "%")),
                (n(Calcium), r(0.73, 0.77, "%")),
                (n(AvailablePhosphorus), r(0.40, 0.44, "%")),
                (n(Sodium), r(0.18, 0.23, "%")),
                (n(Ash), r(5.0, 6.0, "%")),
                (n(Choline), min_only(1600.0, "mg/kg")),
                (ca_avp, r(1.7, 1.9, "")),
            ]),
        );
        m.insert(
            GrowthPhase::Finisher1,
            phase_profile([
                (me, r(3050.0, 3150.0, "kcal/kg")),
                (n(CrudeProtein), r(19.0, 20.0, "%")),
                (n(Lysine), r(1.08, 1.10, "%")),
                (n(MethionineCystine), r(0.86, 0.88, "%")),
                (n(Arginine), r(1.17, 1.19, "%")),
                (n(Threonine), r(0.72, 0.74, "%")),
                (n(Valine), r(0.84, 0.86, "%")),
                (n(Isoleucine), r(0.75, 0.77, "%")),
                (n(Calcium), r(0.68, 0.72, "%")),
                (n(AvailablePhosphorus), r(0.38, 0.42, "%")),
                (n(Sodium), r(0.16, 0.21, "%")),
                (n(Ash), r(4.5, 5.5, "%")),
                (n(Choline), min_only(1500.0, "mg/kg")),
                (ca_avp, r(1.6, 1.8, "")),
            ]),
        );
        m.insert(
            GrowthPhase::Finisher2,
            phase_profile([
                (me, r(3100.0, 3200.0, "kcal/kg")),
                (n(CrudeProtein), r(18.0, 19.0, "%")),
                (n(Lysine), r(1.02, 1.04, "%")),
                (n(MethionineCystine), r(0.82, 0.84, "%")),
                (n(Arginine), r(1.12, 1.14, "%")),
                (n(Threonine), r(0.68, 0.70, "%")),
                (n(Valine), r(0.80, 0.82, "%")),
                (n(Isoleucine), r(0.70, 0.72, "%")),
                (n(Calcium), r(0.63, 0.67, "%")),
                (n(AvailablePhosphorus), r(0.35, 0.39, "%")),
                (n(Sodium), r(0.16, 0.21, "%")),
                (n(Ash), r(4.5, 5.5, "%")),
                (n(Choline), min_only(1400.0, "mg/kg")),
                (ca_avp, r(1.6, 1.8, "")),
            ]),
        );
        m
    });

/// Built-in profile for a growth phase.
pub fn ross_308_profile(phase: GrowthPhase) -> RecommendationProfile {
    ROSS_308_RECOMMENDATIONS
        .get(&phase)
        .cloned()
        .unwrap_or_default()
}

/// Built-in profile with user overrides applied.
///
/// Overrides replace the bounds but keep the built-in unit. Overrides for
/// metrics the phase has no target for are ignored.
pub fn effective_profile(
    phase: GrowthPhase,
    overrides: &RecommendationOverrides,
) -> RecommendationProfile {
    let mut profile = ross_308_profile(phase);
    for (metric, bounds) in overrides {
        match profile.get_mut(metric) {
            Some(rec) => {
                rec.min = bounds.min;
                rec.max = bounds.max;
            }
            None => tracing::debug!(metric = %metric, phase = %phase, "override has no target"),
        }
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_phase_has_profile() {
        for phase in GrowthPhase::ALL {
            let profile = ross_308_profile(phase);
            assert_eq!(profile.len(), 14);
            assert!(profile[&Metric::Nutrient(Nutrient::Choline)].is_minimum_only());
        }
    }

    #[test]
    fn test_phase_parse() {
        assert_eq!("finisher-1".parse::<GrowthPhase>().unwrap(), GrowthPhase::Finisher1);
        assert_eq!("Finisher 2".parse::<GrowthPhase>().unwrap(), GrowthPhase::Finisher2);
        assert_eq!("starter".parse::<GrowthPhase>().unwrap(), GrowthPhase::Starter);
        assert!("layer".parse::<GrowthPhase>().is_err());
    }

    #[test]
    fn test_phase_serde_names() {
        let json = serde_json::to_string(&GrowthPhase::Finisher1).unwrap();
        assert_eq!(json, "\"Finisher 1\"");
    }

    #[test]
    fn test_override_validation() {
        let cp = Metric::Nutrient(Nutrient::CrudeProtein);
        assert!(RecommendationOverride::new(cp, 20.0, Some(22.0)).is_ok());
        assert!(RecommendationOverride::new(cp, 20.0, None).is_ok());
        assert!(RecommendationOverride::new(cp, 23.0, Some(22.0)).is_err());
        assert!(RecommendationOverride::new(cp, f64::NAN, None).is_err());
    }

    #[test]
    fn test_effective_profile_applies_overrides() {
        let cp = Metric::Nutrient(Nutrient::CrudeProtein);
        let mut overrides = RecommendationOverrides::new();
        overrides.insert(cp, RecommendationOverride::new(cp, 20.0, None).unwrap());

        let profile = effective_profile(GrowthPhase::Starter, &overrides);
        let rec = profile[&cp];
        assert_eq!(rec.min, 20.0);
        assert!(rec.is_minimum_only());
        assert_eq!(rec.unit, "%");
    }
}

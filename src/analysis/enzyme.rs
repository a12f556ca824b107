use std::collections::BTreeMap;

use crate::analysis::constants::{
    CONTRIBUTION_EPSILON, GRAMS_PER_TON_PER_PCT, MAX_DOSE_RESPONSE_RATIO,
};
use crate::models::{EnzymeContribution, Ingredient, Nutrient, NutrientValues};

/// Actual enzyme dosage in g/ton for an inclusion rate in percent.
#[inline]
pub fn actual_dosage_g_per_ton(inclusion_pct: f64) -> f64 {
    inclusion_pct * GRAMS_PER_TON_PER_PCT
}

/// Fraction of the matrix effect realized at the given inclusion.
///
/// Linear up to the standard dosage, then flat at 1.0. Returns `None`
/// when the standard dosage is not a positive number.
pub fn dose_response_ratio(inclusion_pct: f64, standard_dosage_g_per_ton: f64) -> Option<f64> {
    if !(standard_dosage_g_per_ton > 0.0) {
        return None;
    }
    let ratio = actual_dosage_g_per_ton(inclusion_pct) / standard_dosage_g_per_ton;
    Some(ratio.min(MAX_DOSE_RESPONSE_RATIO))
}

/// Uplift one enzyme adds to the blend, computed from the enzyme alone.
#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeUplift {
    pub id: u64,
    pub name: String,
    pub ratio: f64,
    /// Uplift for every nutrient in the matrix, including negligible ones.
    pub uplift: BTreeMap<Nutrient, f64>,
}

impl EnzymeUplift {
    /// Contributions large enough to show in the breakdown.
    pub fn recorded(&self) -> BTreeMap<Nutrient, f64> {
        self.uplift
            .iter()
            .filter(|(_, value)| **value > CONTRIBUTION_EPSILON)
            .map(|(nutrient, value)| (*nutrient, *value))
            .collect()
    }
}

/// Compute the uplift of an enzyme ingredient.
///
/// Returns `None` for feed ingredients and for enzymes lacking a positive
/// standard dosage or a matrix.
pub fn enzyme_uplift(ingredient: &Ingredient) -> Option<EnzymeUplift> {
    let profile = ingredient.enzyme_profile()?;
    let standard_dosage = profile.standard_dosage_g_per_ton?;
    let matrix = profile.matrix.as_ref()?;
    let ratio = dose_response_ratio(ingredient.inclusion_pct, standard_dosage)?;

    let uplift = matrix
        .iter()
        .map(|(nutrient, value)| (*nutrient, value * ratio))
        .collect();

    Some(EnzymeUplift {
        id: ingredient.id,
        name: ingredient.name.clone(),
        ratio,
        uplift,
    })
}

/// Add every enzyme's uplift to `profile` and return the recorded breakdown.
///
/// Each enzyme's uplift depends only on the enzyme itself, so the order of
/// `enzymes` does not change the resulting profile. Enzymes sharing an id
/// are merged into one breakdown entry.
pub fn apply_enzymes<'a, I>(enzymes: I, profile: &mut NutrientValues) -> BTreeMap<u64, EnzymeContribution>
where
    I: IntoIterator<Item = &'a Ingredient>,
{
    let mut breakdown: BTreeMap<u64, EnzymeContribution> = BTreeMap::new();

    for enzyme in enzymes {
        let Some(uplift) = enzyme_uplift(enzyme) else {
            tracing::debug!(
                id = enzyme.id,
                name = %enzyme.name,
                "enzyme skipped: no standard dosage or matrix"
            );
            continue;
        };

        tracing::debug!(
            id = uplift.id,
            name = %uplift.name,
            ratio = uplift.ratio,
            "applying enzyme uplift"
        );
        for (nutrient, value) in &uplift.uplift {
            profile.set(*nutrient, profile.get(*nutrient) + value);
        }

        let recorded = uplift.recorded();
        if recorded.is_empty() {
            continue;
        }

        let entry = breakdown
            .entry(uplift.id)
            .or_insert_with(|| EnzymeContribution {
                name: uplift.name.clone(),
                contributions: BTreeMap::new(),
            });
        for (nutrient, value) in recorded {
            *entry.contributions.entry(nutrient).or_insert(0.0) += value;
        }
    }

    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phytase(inclusion_pct: f64) -> Ingredient {
        let matrix = BTreeMap::from([
            (Nutrient::MetabolizableEnergy, 50.0),
            (Nutrient::AvailablePhosphorus, 0.12),
        ]);
        Ingredient::enzyme(101, "Phytase", 100.0, matrix).with_inclusion(inclusion_pct)
    }

    #[test]
    fn test_dose_response_linear_then_flat() {
        assert!((dose_response_ratio(0.005, 100.0).unwrap() - 0.5).abs() < 1e-12);
        assert!((dose_response_ratio(0.01, 100.0).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(dose_response_ratio(0.02, 100.0), Some(1.0));
        assert_eq!(dose_response_ratio(5.0, 100.0), Some(1.0));
    }

    #[test]
    fn test_dose_response_requires_positive_standard() {
        assert_eq!(dose_response_ratio(0.01, 0.0), None);
        assert_eq!(dose_response_ratio(0.01, -50.0), None);
        assert_eq!(dose_response_ratio(0.01, f64::NAN), None);
    }

    #[test]
    fn test_uplift_scales_matrix() {
        let uplift = enzyme_uplift(&phytase(0.005)).unwrap();
        assert!((uplift.ratio - 0.5).abs() < 1e-12);
        assert!((uplift.uplift[&Nutrient::MetabolizableEnergy] - 25.0).abs() < 1e-9);
        assert!((uplift.uplift[&Nutrient::AvailablePhosphorus] - 0.06).abs() < 1e-9);
    }

    #[test]
    fn test_missing_matrix_or_dosage_skips() {
        let mut enzyme = phytase(0.01);
        if let crate::models::IngredientKind::Enzyme(profile) = &mut enzyme.kind {
            profile.matrix = None;
        }
        assert!(enzyme_uplift(&enzyme).is_none());

        let mut enzyme = phytase(0.01);
        if let crate::models::IngredientKind::Enzyme(profile) = &mut enzyme.kind {
            profile.standard_dosage_g_per_ton = None;
        }
        assert!(enzyme_uplift(&enzyme).is_none());
    }

    #[test]
    fn test_negligible_contributions_not_recorded() {
        let matrix = BTreeMap::from([
            (Nutrient::MetabolizableEnergy, 50.0),
            (Nutrient::Lysine, 1e-9),
        ]);
        let enzyme = Ingredient::enzyme(7, "Xylanase", 50.0, matrix).with_inclusion(0.005);

        let mut profile = NutrientValues::default();
        let breakdown = apply_enzymes([&enzyme], &mut profile);

        let entry = &breakdown[&7];
        assert_eq!(entry.contributions.len(), 1);
        assert!(entry.contributions.contains_key(&Nutrient::MetabolizableEnergy));
        // Applied to the profile even though too small to record.
        assert!(profile.get(Nutrient::Lysine) > 0.0);
    }

    #[test]
    fn test_zero_inclusion_enzyme_omitted() {
        let mut profile = NutrientValues::default();
        let breakdown = apply_enzymes([&phytase(0.0)], &mut profile);
        assert!(breakdown.is_empty());
        assert!(profile.is_zero());
    }

    #[test]
    fn test_enzymes_stack_additively() {
        let mut profile = NutrientValues::default().with(Nutrient::MetabolizableEnergy, 3000.0);
        let first = phytase(0.01);
        let mut second = phytase(0.005);
        second.id = 102;

        let breakdown = apply_enzymes([&first, &second], &mut profile);

        assert!((profile.get(Nutrient::MetabolizableEnergy) - 3075.0).abs() < 1e-9);
        assert_eq!(breakdown.len(), 2);
    }
}

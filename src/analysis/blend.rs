use std::collections::BTreeMap;

use crate::analysis::constants::*;
use crate::analysis::enzyme::apply_enzymes;
use crate::models::{DerivedIndex, FeedAnalysis, Ingredient, Metric, Nutrient, NutrientValues};

/// `numerator / denominator`, or 0 when the denominator is not positive.
#[inline]
fn guarded_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Sum of inclusion rates across all ingredients, enzymes included.
pub fn total_inclusion(ingredients: &[Ingredient]) -> f64 {
    ingredients.iter().map(|i| i.inclusion_pct).sum()
}

/// Inclusion-weighted nutrient profile of the feed ingredients.
///
/// Divides by `total_inclusion` (all ingredients, enzymes included) so that
/// enzyme carrier mass dilutes the blend. Non-positive totals yield zeros.
pub fn blend_base_profile<'a, I>(feeds: I, total_inclusion: f64) -> NutrientValues
where
    I: IntoIterator<Item = &'a Ingredient>,
{
    let mut sums = NutrientValues::default();
    for ingredient in feeds {
        for (nutrient, value) in ingredient.nutrients.iter() {
            sums.set(nutrient, sums.get(nutrient) + ingredient.inclusion_pct * value);
        }
    }

    let mut profile = NutrientValues::default();
    for nutrient in Nutrient::ALL {
        profile.set(nutrient, guarded_ratio(sums.get(nutrient), total_inclusion));
    }
    profile
}

/// Compute one derived index from a (post-enzyme) profile.
pub fn derived_index(profile: &NutrientValues, index: DerivedIndex) -> f64 {
    let value = match index {
        DerivedIndex::MeCpRatio => guarded_ratio(
            profile.get(Nutrient::MetabolizableEnergy),
            profile.get(Nutrient::CrudeProtein),
        ),
        DerivedIndex::CaAvPRatio => guarded_ratio(
            profile.get(Nutrient::Calcium),
            profile.get(Nutrient::AvailablePhosphorus),
        ),
        DerivedIndex::KClNaRatio => guarded_ratio(
            profile.get(Nutrient::Potassium) + profile.get(Nutrient::Chloride),
            profile.get(Nutrient::Sodium),
        ),
        DerivedIndex::ElectrolyteBalance => {
            DEB_SODIUM_FACTOR * profile.get(Nutrient::Sodium)
                + DEB_POTASSIUM_FACTOR * profile.get(Nutrient::Potassium)
                - DEB_CHLORIDE_FACTOR * profile.get(Nutrient::Chloride)
        }
    };
    finite_or_zero(value)
}

/// Blended cost per ton over all ingredients, enzymes included.
pub fn blend_cost_per_ton(ingredients: &[Ingredient], total_inclusion: f64) -> f64 {
    if !(total_inclusion > 0.0) {
        return 0.0;
    }
    let weighted: f64 = ingredients
        .iter()
        .map(|i| i.inclusion_pct * i.price_per_ton)
        .sum();
    finite_or_zero(weighted / PERCENT_BASE)
}

/// Analyze a feed mix.
///
/// Pure: the input is only read and the result owns fresh copies of
/// everything it reports. An empty list yields [`FeedAnalysis::empty`].
pub fn analyze_feed(ingredients: &[Ingredient]) -> FeedAnalysis {
    if ingredients.is_empty() {
        return FeedAnalysis::empty();
    }

    let total_inclusion = total_inclusion(ingredients);
    let (enzymes, feeds): (Vec<&Ingredient>, Vec<&Ingredient>) =
        ingredients.iter().partition(|i| i.is_enzyme());

    tracing::debug!(
        feeds = feeds.len(),
        enzymes = enzymes.len(),
        total_inclusion,
        "analyzing feed mix"
    );

    let mut profile = blend_base_profile(feeds, total_inclusion);
    let enzyme_contributions = apply_enzymes(enzymes, &mut profile);

    for nutrient in Nutrient::ALL {
        profile.set(nutrient, finite_or_zero(profile.get(nutrient)));
    }

    let mut nutrients: BTreeMap<Metric, f64> = profile
        .iter()
        .map(|(nutrient, value)| (Metric::Nutrient(nutrient), value))
        .collect();
    for index in DerivedIndex::ALL {
        nutrients.insert(Metric::Derived(index), derived_index(&profile, index));
    }

    let total_cost_per_ton = blend_cost_per_ton(ingredients, total_inclusion);

    FeedAnalysis {
        total_inclusion,
        total_cost_per_ton,
        total_cost_per_100kg: total_cost_per_ton / COST_PER_100KG_DIVISOR,
        nutrients,
        enzyme_contributions,
        ingredients: ingredients.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedCategory;

    fn feed(id: u64, inclusion: f64) -> Ingredient {
        Ingredient::feed(id, format!("Feed {}", id), FeedCategory::Energy).with_inclusion(inclusion)
    }

    #[test]
    fn test_empty_input() {
        let result = analyze_feed(&[]);
        assert_eq!(result, FeedAnalysis::empty());
        assert!(result.nutrients.is_empty());
    }

    #[test]
    fn test_base_profile_weighted_average() {
        let a = feed(1, 60.0).with_nutrient(Nutrient::CrudeProtein, 10.0);
        let b = feed(2, 40.0).with_nutrient(Nutrient::CrudeProtein, 20.0);
        let profile = blend_base_profile([&a, &b], 100.0);
        assert!((profile.get(Nutrient::CrudeProtein) - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_base_profile_zero_total() {
        let a = feed(1, 0.0).with_nutrient(Nutrient::CrudeProtein, 10.0);
        let profile = blend_base_profile([&a], 0.0);
        assert!(profile.is_zero());
    }

    #[test]
    fn test_derived_indices() {
        let profile = NutrientValues::default()
            .with(Nutrient::MetabolizableEnergy, 3000.0)
            .with(Nutrient::CrudeProtein, 20.0)
            .with(Nutrient::Calcium, 0.9)
            .with(Nutrient::AvailablePhosphorus, 0.45)
            .with(Nutrient::Sodium, 0.2)
            .with(Nutrient::Potassium, 0.8)
            .with(Nutrient::Chloride, 0.25);

        assert!((derived_index(&profile, DerivedIndex::MeCpRatio) - 150.0).abs() < 1e-9);
        assert!((derived_index(&profile, DerivedIndex::CaAvPRatio) - 2.0).abs() < 1e-9);
        assert!((derived_index(&profile, DerivedIndex::KClNaRatio) - 5.25).abs() < 1e-9);

        let expected_deb = 434.78 * 0.2 + 256.4 * 0.8 - 281.69 * 0.25;
        assert!((derived_index(&profile, DerivedIndex::ElectrolyteBalance) - expected_deb).abs() < 1e-9);
    }

    #[test]
    fn test_derived_indices_guard_zero_denominators() {
        let profile = NutrientValues::default()
            .with(Nutrient::MetabolizableEnergy, 3000.0)
            .with(Nutrient::Potassium, 0.8);
        assert_eq!(derived_index(&profile, DerivedIndex::MeCpRatio), 0.0);
        assert_eq!(derived_index(&profile, DerivedIndex::CaAvPRatio), 0.0);
        assert_eq!(derived_index(&profile, DerivedIndex::KClNaRatio), 0.0);
    }

    #[test]
    fn test_cost_includes_every_ingredient() {
        let a = feed(1, 99.0).with_price(300.0);
        let enzyme = Ingredient::enzyme(2, "Protease", 200.0, BTreeMap::new())
            .with_inclusion(1.0)
            .with_price(18_000.0);
        let ingredients = vec![a, enzyme];
        let cost = blend_cost_per_ton(&ingredients, total_inclusion(&ingredients));
        assert!((cost - (99.0 * 300.0 + 18_000.0) / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cost_zero_when_no_inclusion() {
        let ingredients = vec![feed(1, 0.0).with_price(300.0)];
        assert_eq!(blend_cost_per_ton(&ingredients, 0.0), 0.0);
    }

    #[test]
    fn test_all_metrics_present_for_non_empty_mix() {
        let result = analyze_feed(&[feed(1, 100.0)]);
        assert_eq!(result.nutrients.len(), Metric::all().count());
        assert!(result.nutrients.values().all(|v| v.is_finite()));
    }

    #[test]
    fn test_enzyme_nutrients_ignored_in_base_blend() {
        let a = feed(1, 99.0).with_nutrient(Nutrient::CrudeProtein, 20.0);
        let enzyme = Ingredient::enzyme(2, "Carrier", 100.0, BTreeMap::new())
            .with_inclusion(1.0)
            .with_nutrient(Nutrient::CrudeProtein, 50.0);
        let result = analyze_feed(&[a, enzyme]);
        let cp = result.nutrient(Nutrient::CrudeProtein).unwrap();
        assert!((cp - 99.0 * 20.0 / 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_input_never_leaks() {
        let a = feed(1, 100.0).with_nutrient(Nutrient::CrudeProtein, f64::INFINITY);
        let result = analyze_feed(&[a]);
        assert!(result.nutrients.values().all(|v| v.is_finite()));
    }
}

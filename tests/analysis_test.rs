#[macro_use]
extern crate assert_float_eq;

use std::collections::BTreeMap;

use feed_mix_analyzer::analysis::analyze_feed;
use feed_mix_analyzer::logging;
use feed_mix_analyzer::models::{DerivedIndex, FeedCategory, Ingredient, Nutrient};

fn make_feed(id: u64, inclusion: f64, cp: f64, price: f64) -> Ingredient {
    Ingredient::feed(id, format!("Feed {}", id), FeedCategory::Energy)
        .with_inclusion(inclusion)
        .with_nutrient(Nutrient::CrudeProtein, cp)
        .with_price(price)
}

fn make_enzyme(id: u64, inclusion: f64, standard: f64, matrix: &[(Nutrient, f64)]) -> Ingredient {
    let matrix: BTreeMap<Nutrient, f64> = matrix.iter().copied().collect();
    Ingredient::enzyme(id, format!("Enzyme {}", id), standard, matrix).with_inclusion(inclusion)
}

#[test]
fn test_empty_mix() {
    logging::init_test();
    let result = analyze_feed(&[]);
    assert_eq!(result.total_inclusion, 0.0);
    assert_eq!(result.total_cost_per_ton, 0.0);
    assert!(result.nutrients.is_empty());
    assert!(result.enzyme_contributions.is_empty());
}

#[test]
fn test_single_feed_ingredient() {
    let result = analyze_feed(&[make_feed(1, 100.0, 20.0, 300.0)]);

    assert_float_absolute_eq!(result.nutrient(Nutrient::CrudeProtein).unwrap(), 20.0, 1e-9);
    assert_float_absolute_eq!(result.total_cost_per_ton, 300.0, 1e-9);
    assert_float_absolute_eq!(result.total_cost_per_100kg, 30.0, 1e-9);
}

#[test]
fn test_enzyme_carrier_dilutes_blend() {
    let ingredients = vec![
        make_feed(1, 50.0, 20.0, 0.0),
        make_feed(2, 50.0, 0.0, 0.0),
        make_enzyme(3, 1.0, 100.0, &[]),
    ];

    let result = analyze_feed(&ingredients);

    assert_float_absolute_eq!(result.total_inclusion, 101.0, 1e-12);
    assert_float_absolute_eq!(
        result.nutrient(Nutrient::CrudeProtein).unwrap(),
        1000.0 / 101.0,
        1e-9
    );
    assert_float_absolute_eq!(result.nutrient(Nutrient::CrudeProtein).unwrap(), 9.901, 1e-3);
}

#[test]
fn test_enzyme_saturates_at_standard_dosage() {
    let half = vec![
        make_feed(1, 100.0, 0.0, 0.0),
        make_enzyme(2, 0.005, 100.0, &[(Nutrient::MetabolizableEnergy, 50.0)]),
    ];
    let result = analyze_feed(&half);
    let contribution = result.enzyme_contributions[&2].contributions[&Nutrient::MetabolizableEnergy];
    assert_float_absolute_eq!(contribution, 25.0, 1e-9);
    assert_float_absolute_eq!(
        result.nutrient(Nutrient::MetabolizableEnergy).unwrap(),
        25.0,
        1e-9
    );

    for inclusion in [0.02, 0.1, 1.0] {
        let over = vec![
            make_feed(1, 100.0, 0.0, 0.0),
            make_enzyme(2, inclusion, 100.0, &[(Nutrient::MetabolizableEnergy, 50.0)]),
        ];
        let result = analyze_feed(&over);
        let contribution =
            result.enzyme_contributions[&2].contributions[&Nutrient::MetabolizableEnergy];
        assert_float_absolute_eq!(contribution, 50.0, 1e-9);
    }
}

#[test]
fn test_derived_ratio_guards() {
    let no_protein = Ingredient::feed(1, "Oil", FeedCategory::Energy)
        .with_inclusion(100.0)
        .with_nutrient(Nutrient::MetabolizableEnergy, 8800.0)
        .with_nutrient(Nutrient::Potassium, 0.5);

    let result = analyze_feed(&[no_protein]);

    assert_eq!(result.derived(DerivedIndex::MeCpRatio), Some(0.0));
    assert_eq!(result.derived(DerivedIndex::KClNaRatio), Some(0.0));
    assert!(result.nutrients.values().all(|v| v.is_finite()));
}

#[test]
fn test_analysis_is_idempotent() {
    let ingredients = vec![
        make_feed(1, 60.0, 7.8, 325.0),
        make_feed(2, 35.0, 44.0, 520.0),
        make_enzyme(3, 0.01, 100.0, &[(Nutrient::AvailablePhosphorus, 0.12)]),
    ];

    let first = analyze_feed(&ingredients);
    let second = analyze_feed(&ingredients);

    assert_eq!(first, second);
}

#[test]
fn test_enzyme_order_does_not_matter() {
    let feed = make_feed(1, 99.0, 20.0, 300.0);
    let phytase = make_enzyme(
        101,
        0.01,
        100.0,
        &[(Nutrient::AvailablePhosphorus, 0.12), (Nutrient::CrudeProtein, 0.4)],
    );
    let protease = make_enzyme(103, 0.02, 200.0, &[(Nutrient::CrudeProtein, 0.8)]);

    let forward = analyze_feed(&[feed.clone(), phytase.clone(), protease.clone()]);
    let reverse = analyze_feed(&[protease, feed, phytase]);

    for (metric, value) in &forward.nutrients {
        assert_float_absolute_eq!(*value, reverse.nutrients[metric], 1e-12);
    }
    assert_eq!(forward.enzyme_contributions, reverse.enzyme_contributions);
}

#[test]
fn test_enzyme_without_dosage_data_is_skipped() {
    logging::init_test();
    let mut broken = make_enzyme(5, 0.01, 100.0, &[(Nutrient::CrudeProtein, 1.0)]);
    if let feed_mix_analyzer::models::IngredientKind::Enzyme(profile) = &mut broken.kind {
        profile.standard_dosage_g_per_ton = None;
    }

    let result = analyze_feed(&[make_feed(1, 100.0, 20.0, 300.0), broken]);

    assert!(result.enzyme_contributions.is_empty());
    assert_float_absolute_eq!(
        result.nutrient(Nutrient::CrudeProtein).unwrap(),
        2000.0 / 100.01,
        1e-9
    );
}

#[test]
fn test_derived_ratios_include_enzyme_uplift() {
    let feed = Ingredient::feed(1, "Base", FeedCategory::Energy)
        .with_inclusion(100.0)
        .with_nutrient(Nutrient::Calcium, 0.9)
        .with_nutrient(Nutrient::AvailablePhosphorus, 0.3);
    let phytase = make_enzyme(2, 0.01, 100.0, &[(Nutrient::AvailablePhosphorus, 0.15)]);

    let result = analyze_feed(&[feed, phytase]);

    let ca = 0.9 * 100.0 / 100.01;
    let avp = 0.3 * 100.0 / 100.01 + 0.15;
    assert_float_absolute_eq!(result.nutrient(Nutrient::AvailablePhosphorus).unwrap(), avp, 1e-9);
    let ratio = result.derived(DerivedIndex::CaAvPRatio).unwrap();
    assert_float_absolute_eq!(ratio, ca / avp, 1e-9);
    assert!((ratio - 3.0).abs() > 0.5);
}

#[test]
fn test_me_cp_ratio_includes_enzyme_uplift() {
    let feed = Ingredient::feed(1, "Base", FeedCategory::Energy)
        .with_inclusion(100.0)
        .with_nutrient(Nutrient::MetabolizableEnergy, 3000.0)
        .with_nutrient(Nutrient::CrudeProtein, 20.0);
    let carbohydrase = make_enzyme(2, 0.01, 100.0, &[(Nutrient::MetabolizableEnergy, 100.0)]);

    let result = analyze_feed(&[feed, carbohydrase]);

    let me = 3000.0 * 100.0 / 100.01 + 100.0;
    let cp = 20.0 * 100.0 / 100.01;
    assert_float_absolute_eq!(result.derived(DerivedIndex::MeCpRatio).unwrap(), me / cp, 1e-9);
    assert!(result.derived(DerivedIndex::MeCpRatio).unwrap() > 3000.0 / 20.0);
}

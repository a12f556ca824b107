use crate::analysis::{needs_normalization, InclusionMode};
use crate::models::{FeedAnalysis, Ingredient, Metric, Nutrient};
use crate::recommend::{GrowthPhase, NutrientComparison, RangeStatus};
use crate::state::AnalysisSettings;
use crate::units::{convert, ReportField};

/// Format a value in the unit the user picked for `field`.
pub fn format_field(value: f64, field: ReportField, settings: &AnalysisSettings) -> String {
    let converted = convert(value, field, settings.unit_for(field));
    let decimals = match converted.unit {
        "kcal/kg" | "mg/kg" | "ppm" | "mEq/kg" => 0,
        "$/ton" | "$/100kg" | "$/kg" | "MJ/kg" => 2,
        _ => 3,
    };
    if converted.unit.is_empty() {
        format!("{:.*}", decimals, converted.value)
    } else {
        format!("{:.*} {}", decimals, converted.value, converted.unit)
    }
}

fn status_marker(status: RangeStatus) -> &'static str {
    if status.is_ok() {
        "ok"
    } else if status.is_warning() {
        "~~"
    } else {
        "!!"
    }
}

/// Print the warning shown when a mix does not add up to 100 %.
pub fn display_normalization_warning(total_inclusion: f64) {
    if needs_normalization(total_inclusion) {
        println!(
            "Warning: total inclusion is {:.3} % (expected 100 %). Values are normalized to the actual total.",
            total_inclusion
        );
    }
}

/// Display the ingredients of a mix with their inclusion in the chosen mode.
pub fn display_mix(ingredients: &[Ingredient], mode: InclusionMode) {
    if ingredients.is_empty() {
        println!("Mix is empty.");
        return;
    }

    println!();
    println!("=== Mix ({} ingredients) ===", ingredients.len());
    println!();

    let width = ingredients.iter().map(|i| i.name.len()).max().unwrap_or(10);
    for ingredient in ingredients {
        let tag = if ingredient.is_enzyme() { "  [enzyme]" } else { "" };
        println!(
            "{:>4}. {:<width$} {:>10.4} {}{}",
            ingredient.id,
            ingredient.name,
            mode.to_display(ingredient.inclusion_pct),
            mode.unit(),
            tag,
            width = width
        );
    }

    let total: f64 = ingredients.iter().map(|i| i.inclusion_pct).sum();
    println!();
    println!("Total: {:.3} {}", mode.to_display(total), mode.unit());
    println!();
}

/// Display a full analysis: costs, visible nutrients and enzyme breakdown.
pub fn display_analysis(analysis: &FeedAnalysis, settings: &AnalysisSettings) {
    if analysis.is_empty() {
        println!("No ingredients in mix; nothing to analyze.");
        return;
    }

    println!();
    println!("=== Feed Analysis ===");
    println!();
    println!("Total inclusion: {:.3} %", analysis.total_inclusion);
    display_normalization_warning(analysis.total_inclusion);

    for (field, value) in [
        (ReportField::CostPerTon, analysis.total_cost_per_ton),
        (ReportField::CostPer100kg, analysis.total_cost_per_100kg),
    ] {
        if settings.is_visible(field) {
            println!("{}: {}", field.label(), format_field(value, field, settings));
        }
    }

    println!();
    println!("--- Nutrients ---");
    let width = Metric::all().map(|m| m.label().len()).max().unwrap_or(20);
    for (metric, value) in &analysis.nutrients {
        let field = ReportField::Metric(*metric);
        if !settings.is_visible(field) {
            continue;
        }
        println!(
            "  {:<width$}  {:>14}",
            metric.label(),
            format_field(*value, field, settings),
            width = width
        );
    }

    display_enzyme_contributions(analysis, settings);
    println!();
}

/// Display the nutrient uplift credited to each enzyme.
pub fn display_enzyme_contributions(analysis: &FeedAnalysis, settings: &AnalysisSettings) {
    if analysis.enzyme_contributions.is_empty() {
        return;
    }

    println!();
    println!("--- Enzyme Contributions ---");
    for contribution in analysis.enzyme_contributions.values() {
        let parts: Vec<String> = contribution
            .contributions
            .iter()
            .map(|(nutrient, value)| {
                let field = ReportField::Metric(Metric::Nutrient(*nutrient));
                format!("{} +{}", nutrient_short(*nutrient), format_field(*value, field, settings))
            })
            .collect();
        println!("  {}: {}", contribution.name, parts.join(", "));
    }
}

fn nutrient_short(nutrient: Nutrient) -> &'static str {
    nutrient.key().trim_end_matches("_pct").trim_end_matches("_kcal_per_kg")
}

/// Display a comparison table grouped the way the rows were produced.
pub fn display_comparison(
    rows: &[NutrientComparison],
    phase: GrowthPhase,
    settings: &AnalysisSettings,
) {
    println!();
    println!("=== Comparison vs Ross 308 {} ===", phase);

    let width = rows.iter().map(|r| r.metric.label().len()).max().unwrap_or(20);
    let mut current_group = "";

    for row in rows {
        let field = ReportField::Metric(row.metric);
        if !settings.is_visible(field) {
            continue;
        }
        if row.group != current_group {
            current_group = row.group;
            println!();
            println!("--- {} ---", current_group);
        }

        let target = match row.recommendation.max {
            Some(max) => format!(
                "{} - {}",
                format_field(row.recommendation.min, field, settings),
                format_field(max, field, settings)
            ),
            None => format!("≥ {}", format_field(row.recommendation.min, field, settings)),
        };
        let sign = if row.deviation >= 0.0 { "+" } else { "" };
        let custom = if row.overridden { " (custom)" } else { "" };

        println!(
            "  [{}] {:<width$}  {:>14} | target {}{} | dev {}{:.3} | {}",
            status_marker(row.status),
            row.metric.label(),
            format_field(row.value, field, settings),
            target,
            custom,
            sign,
            row.deviation,
            row.status,
            width = width
        );
    }

    let flagged = rows.iter().filter(|r| !r.status.is_ok()).count();
    println!();
    println!("--- Summary ---");
    println!("Checked: {}", rows.len());
    println!("Needs attention: {}", flagged);
    println!();
}

/// Display a catalog listing.
pub fn display_catalog(ingredients: &[Ingredient]) {
    if ingredients.is_empty() {
        println!("Catalog: (none)");
        return;
    }

    println!();
    println!("=== Catalog ({} items) ===", ingredients.len());
    println!();

    let width = ingredients.iter().map(|i| i.name.len()).max().unwrap_or(10);
    for ingredient in ingredients {
        let detail = match ingredient.enzyme_profile() {
            Some(profile) => format!(
                "std dose {} g/t",
                profile
                    .standard_dosage_g_per_ton
                    .map_or_else(|| "?".to_string(), |d| format!("{:.0}", d))
            ),
            None => format!(
                "CP {:.1} %, ME {:.0} kcal/kg",
                ingredient.nutrients.get(Nutrient::CrudeProtein),
                ingredient.nutrients.get(Nutrient::MetabolizableEnergy)
            ),
        };
        println!(
            "{:>4}. {:<width$}  {:<20} ${:>9.2}/t  {}",
            ingredient.id,
            ingredient.name,
            ingredient.category().display_name(),
            ingredient.price_per_ton,
            detail,
            width = width
        );
    }

    println!();
}

/// Display the active settings.
pub fn display_settings(settings: &AnalysisSettings) {
    println!();
    println!("=== Settings ===");
    println!("Growth phase: {}", settings.growth_phase);
    println!("Inclusion mode: {} ({})", settings.inclusion_mode, settings.inclusion_mode.unit());

    if settings.overrides.is_empty() {
        println!("Overrides: (none)");
    } else {
        println!("Overrides:");
        for (metric, bounds) in &settings.overrides {
            match bounds.max {
                Some(max) => println!("  {}: {} - {}", metric.key(), bounds.min, max),
                None => println!("  {}: ≥ {}", metric.key(), bounds.min),
            }
        }
    }

    let custom_units: Vec<String> = settings
        .units
        .iter()
        .filter(|(field, unit)| unit.as_str() != crate::units::base_unit(**field))
        .map(|(field, unit)| format!("{} = {}", field, unit))
        .collect();
    if !custom_units.is_empty() {
        println!("Units: {}", custom_units.join(", "));
    }

    let hidden: Vec<String> = ReportField::all()
        .filter(|f| !settings.is_visible(*f))
        .map(|f| f.key())
        .collect();
    if !hidden.is_empty() {
        println!("Hidden: {}", hidden.join(", "));
    }
    println!();
}

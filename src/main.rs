use clap::Parser;
use std::path::Path;

use feed_mix_analyzer::analysis::{
    analyze_feed, needs_normalization, normalize_inclusions, InclusionMode,
};
use feed_mix_analyzer::cli::{CatalogCommand, Cli, Command, MixCommand, SettingsCommand};
use feed_mix_analyzer::error::{FeedError, Result};
use feed_mix_analyzer::interface::{
    display_analysis, display_catalog, display_comparison, display_mix,
    display_normalization_warning, display_settings, edit_inclusions, prompt_category,
    prompt_ingredient_details, prompt_ingredient_picks, prompt_mix_action, prompt_mix_row,
    prompt_override, prompt_row_overrides, prompt_yes_no, MixEditAction,
};
use feed_mix_analyzer::logging;
use feed_mix_analyzer::models::{Ingredient, Metric};
use feed_mix_analyzer::recommend::{compare, effective_profile, GrowthPhase};
use feed_mix_analyzer::state::{
    export_analysis_csv, export_csv, load_any, load_ingredients, save_ingredients,
    AnalysisSettings, IngredientCatalog, JsonFileStore,
};
use feed_mix_analyzer::units::ReportField;

fn main() {
    logging::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            mix,
            json,
            export_csv: export,
        } => cmd_analyze(&cli.settings, &mix, json, export.as_deref()),
        Command::Compare { mix, phase } => cmd_compare(&cli.settings, &mix, phase.as_deref()),
        Command::Mix { action } => cmd_mix(&cli.catalog, &cli.settings, action),
        Command::Catalog { action } => cmd_catalog(&cli.catalog, action),
        Command::Settings { action } => cmd_settings(&cli.settings, action),
    }
}

/// Load the catalog file, or the built-in catalog when it does not exist yet.
fn load_catalog(path: &Path) -> Result<IngredientCatalog> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "catalog file not found, using built-in catalog");
        return IngredientCatalog::default_catalog();
    }
    Ok(IngredientCatalog::new(load_any(path)?))
}

fn load_settings(path: &Path) -> Result<(JsonFileStore, AnalysisSettings)> {
    let store = JsonFileStore::open(path)?;
    let settings = AnalysisSettings::load(&store)?;
    Ok((store, settings))
}

fn parse_metric(field: &str) -> Result<Metric> {
    match field.parse::<ReportField>()? {
        ReportField::Metric(metric) => Ok(metric),
        _ => Err(FeedError::UnknownField(field.to_string())),
    }
}

fn load_mix(path: &Path) -> Result<Vec<Ingredient>> {
    if !path.exists() {
        return Err(FeedError::InvalidInput(format!(
            "Mix file not found: {}",
            path.display()
        )));
    }
    load_ingredients(path)
}

/// Analyze a mix and print or export the result.
fn cmd_analyze(
    settings_path: &Path,
    mix_path: &Path,
    json: bool,
    export: Option<&Path>,
) -> Result<()> {
    let (_, settings) = load_settings(settings_path)?;
    let mix = load_mix(mix_path)?;
    let analysis = analyze_feed(&mix);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        display_analysis(&analysis, &settings);
    }

    if let Some(path) = export {
        export_analysis_csv(path, &analysis)?;
        println!("Analysis exported to {}", path.display());
    }

    Ok(())
}

/// Compare a mix against the phase recommendations.
fn cmd_compare(settings_path: &Path, mix_path: &Path, phase: Option<&str>) -> Result<()> {
    let (_, settings) = load_settings(settings_path)?;
    let phase = match phase {
        Some(name) => name.parse::<GrowthPhase>()?,
        None => settings.growth_phase,
    };

    let mix = load_mix(mix_path)?;
    let analysis = analyze_feed(&mix);
    if analysis.is_empty() {
        println!("No ingredients in mix; nothing to compare.");
        return Ok(());
    }

    display_normalization_warning(analysis.total_inclusion);

    let profile = effective_profile(phase, &settings.overrides);
    let rows = compare(&analysis, &profile, &settings.overridden_metrics());
    display_comparison(&rows, phase, &settings);

    Ok(())
}

/// Offer to scale the mix to 100 % when it is off.
fn maybe_normalize(mix: Vec<Ingredient>) -> Result<Vec<Ingredient>> {
    let total: f64 = mix.iter().map(|i| i.inclusion_pct).sum();
    if !needs_normalization(total) || total <= 0.0 {
        return Ok(mix);
    }

    display_normalization_warning(total);
    if prompt_yes_no("Normalize the mix to 100 %?", true)? {
        return Ok(normalize_inclusions(&mix));
    }
    Ok(mix)
}

fn cmd_mix(catalog_path: &Path, settings_path: &Path, action: MixCommand) -> Result<()> {
    let (_, settings) = load_settings(settings_path)?;
    let mode = settings.inclusion_mode;

    match action {
        MixCommand::New { out, ids } => {
            let catalog = load_catalog(catalog_path)?;
            let ids = if ids.is_empty() {
                prompt_ingredient_picks(&catalog)?
            } else {
                ids
            };
            if ids.is_empty() {
                println!("No ingredients selected.");
                return Ok(());
            }

            let mut mix = catalog.select(&ids, &[])?;
            edit_inclusions(&mut mix, mode)?;
            let mix = maybe_normalize(mix)?;

            save_ingredients(&out, &mix)?;
            display_mix(&mix, mode);
            println!("Mix saved to {}", out.display());
        }
        MixCommand::Edit { mix: path } => {
            let mix = edit_mix(catalog_path, load_mix(&path)?, mode)?;
            let mix = maybe_normalize(mix)?;

            save_ingredients(&path, &mix)?;
            display_mix(&mix, mode);
            println!("Mix saved.");
        }
        MixCommand::Normalize { mix: path } => {
            let mix = load_mix(&path)?;
            let total: f64 = mix.iter().map(|i| i.inclusion_pct).sum();
            if total <= 0.0 {
                println!("Mix has no inclusion to scale.");
                return Ok(());
            }

            let mix = normalize_inclusions(&mix);
            save_ingredients(&path, &mix)?;
            display_mix(&mix, mode);
            println!("Mix normalized from {:.3} % to 100 %.", total);
        }
        MixCommand::Show { mix: path } => {
            let mix = load_mix(&path)?;
            display_mix(&mix, mode);
        }
    }

    Ok(())
}

/// Interactive mix editor loop. Works on the loaded copy until "Done".
fn edit_mix(
    catalog_path: &Path,
    mut mix: Vec<Ingredient>,
    mode: InclusionMode,
) -> Result<Vec<Ingredient>> {
    loop {
        display_mix(&mix, mode);

        match prompt_mix_action()? {
            MixEditAction::EditInclusions => edit_inclusions(&mut mix, mode)?,
            MixEditAction::OverrideRow => {
                if let Some(index) = prompt_mix_row(&mix, "Row to change")? {
                    prompt_row_overrides(&mut mix[index])?;
                }
            }
            MixEditAction::AddIngredients => {
                let catalog = load_catalog(catalog_path)?;
                let ids = prompt_ingredient_picks(&catalog)?;
                mix = catalog.add_to_mix(&ids, &mix)?;
            }
            MixEditAction::RemoveIngredient => {
                if let Some(index) = prompt_mix_row(&mix, "Ingredient to remove")? {
                    let removed = mix.remove(index);
                    println!("Removed: {}", removed.name);
                }
            }
            MixEditAction::Done => return Ok(mix),
        }
    }
}

fn cmd_catalog(catalog_path: &Path, action: CatalogCommand) -> Result<()> {
    match action {
        CatalogCommand::List { enzymes } => {
            let catalog = load_catalog(catalog_path)?;
            if enzymes {
                let list: Vec<Ingredient> = catalog.enzymes().into_iter().cloned().collect();
                display_catalog(&list);
            } else {
                display_catalog(catalog.all());
            }
        }
        CatalogCommand::Add => {
            let mut catalog = load_catalog(catalog_path)?;
            let blank = Ingredient::blank(0, prompt_category()?);
            let ingredient = prompt_ingredient_details(&blank)?;

            let name = ingredient.name.clone();
            let id = catalog.add(ingredient);
            save_ingredients(catalog_path, catalog.all())?;
            println!("Added {} with id {}.", name, id);
        }
        CatalogCommand::Edit { id } => {
            let mut catalog = load_catalog(catalog_path)?;
            let current = catalog.get(id).ok_or(FeedError::IngredientNotFound(id))?;
            let edited = prompt_ingredient_details(current)?;

            catalog.update(edited)?;
            save_ingredients(catalog_path, catalog.all())?;
            println!("Ingredient {} updated.", id);
        }
        CatalogCommand::Import { file } => {
            let mut catalog = load_catalog(catalog_path)?;
            let imported = load_any(&file)?;
            let summary = catalog.merge(imported);

            save_ingredients(catalog_path, catalog.all())?;
            println!(
                "Imported {} ingredients ({} updated, {} added).",
                summary.updated + summary.added,
                summary.updated,
                summary.added
            );
        }
        CatalogCommand::Export { file } => {
            let catalog = load_catalog(catalog_path)?;
            let is_csv = file
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            if is_csv {
                export_csv(&file, catalog.all())?;
            } else {
                save_ingredients(&file, catalog.all())?;
            }
            println!("Exported {} ingredients to {}", catalog.len(), file.display());
        }
        CatalogCommand::Reset { yes } => {
            if !yes && !prompt_yes_no("Replace the catalog with the built-in one?", false)? {
                return Ok(());
            }
            let catalog = IngredientCatalog::default_catalog()?;
            save_ingredients(catalog_path, catalog.all())?;
            println!("Catalog reset ({} ingredients).", catalog.len());
        }
    }

    Ok(())
}

fn cmd_settings(settings_path: &Path, action: SettingsCommand) -> Result<()> {
    let (mut store, mut settings) = load_settings(settings_path)?;

    match action {
        SettingsCommand::Show => {
            display_settings(&settings);
            return Ok(());
        }
        SettingsCommand::Phase { phase } => {
            settings.growth_phase = phase.parse()?;
            println!("Growth phase set to {}.", settings.growth_phase);
        }
        SettingsCommand::InclusionMode { mode } => {
            settings.inclusion_mode = mode.parse()?;
            println!("Inclusion mode set to {}.", settings.inclusion_mode);
        }
        SettingsCommand::Unit { field, unit } => {
            let field: ReportField = field.parse()?;
            settings.set_unit(field, &unit)?;
            println!("{} now shown in {}.", field, unit);
        }
        SettingsCommand::Override { field, min, max } => {
            let metric = parse_metric(&field)?;
            let (min, max) = match min {
                Some(min) => (min, max),
                None => prompt_override(metric)?,
            };
            settings.set_override(metric, min, max)?;
            println!("Override saved for {}.", metric.key());
        }
        SettingsCommand::ClearOverride { field } => {
            let metric = parse_metric(&field)?;
            if settings.clear_override(metric) {
                println!("Override removed for {}.", metric.key());
            } else {
                println!("No override set for {}.", metric.key());
            }
        }
        SettingsCommand::ResetOverrides => {
            settings.reset_overrides();
            println!("All overrides removed.");
        }
        SettingsCommand::Hide { field } => {
            let field: ReportField = field.parse()?;
            settings.set_visible(field, false);
            println!("{} hidden.", field);
        }
        SettingsCommand::ShowField { field } => {
            let field: ReportField = field.parse()?;
            settings.set_visible(field, true);
            println!("{} shown.", field);
        }
    }

    settings.save(&mut store)?;
    tracing::info!(path = %store.path().display(), "settings saved");
    Ok(())
}

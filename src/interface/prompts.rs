use dialoguer::{Confirm, Input, Select};

use crate::analysis::InclusionMode;
use crate::error::{FeedError, Result};
use crate::models::{
    EnzymeProfile, Ingredient, IngredientCategory, IngredientKind, Metric, Nutrient,
    NutrientValues,
};
use crate::state::IngredientCatalog;

fn parse_number(input: &str) -> Result<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| FeedError::InvalidInput(format!("Invalid number '{}'", input.trim())))?;
    if !value.is_finite() {
        return Err(FeedError::InvalidInput("Value must be finite".to_string()));
    }
    Ok(value)
}

/// Prompt for one ingredient's inclusion, entered in `mode`. Returns a percentage.
pub fn prompt_inclusion(ingredient: &Ingredient, mode: InclusionMode) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(format!("{} ({})", ingredient.name, mode.unit()))
        .default(format!("{}", mode.to_display(ingredient.inclusion_pct)))
        .interact_text()?;

    let value = parse_number(&input)?;
    if value < 0.0 {
        return Err(FeedError::InvalidInput(
            "Inclusion cannot be negative".to_string(),
        ));
    }
    Ok(mode.from_display(value))
}

/// Walk the mix and edit every inclusion in place.
pub fn edit_inclusions(mix: &mut [Ingredient], mode: InclusionMode) -> Result<()> {
    for ingredient in mix.iter_mut() {
        ingredient.inclusion_pct = prompt_inclusion(ingredient, mode)?;
    }
    Ok(())
}

/// Pick ingredients from the catalog by name, with fuzzy matching.
pub fn prompt_ingredient_picks(catalog: &IngredientCatalog) -> Result<Vec<u64>> {
    let mut picked = Vec::new();

    loop {
        let input: String = Input::new()
            .with_prompt("Add an ingredient (or press Enter to finish)")
            .allow_empty(true)
            .interact_text()?;

        let input = input.trim();
        if input.is_empty() {
            break;
        }

        if let Some(ingredient) = catalog.find_by_name(input) {
            if !picked.contains(&ingredient.id) {
                picked.push(ingredient.id);
            }
            println!("Added: {}", ingredient.name);
            continue;
        }

        let candidates = catalog.suggest(input);

        if candidates.is_empty() {
            println!("No matching ingredient found for '{}'", input);
            continue;
        }

        let chosen = if candidates.len() == 1 {
            let confirm = Confirm::new()
                .with_prompt(format!("Did you mean '{}'?", candidates[0].name))
                .default(true)
                .interact()?;
            confirm.then(|| candidates[0])
        } else {
            let mut options: Vec<String> = candidates.iter().map(|i| i.name.clone()).collect();
            options.push("None of these".to_string());

            let selection = Select::new()
                .with_prompt("Which did you mean?")
                .items(&options)
                .default(0)
                .interact()?;
            candidates.get(selection).copied()
        };

        if let Some(ingredient) = chosen {
            if !picked.contains(&ingredient.id) {
                picked.push(ingredient.id);
            }
            println!("Added: {}", ingredient.name);
        }
    }

    Ok(picked)
}

/// Prompt for a recommendation override. An empty maximum means minimum-only.
pub fn prompt_override(metric: Metric) -> Result<(f64, Option<f64>)> {
    let min: String = Input::new()
        .with_prompt(format!("Minimum {} ({})", metric.label(), metric.base_unit()))
        .interact_text()?;
    let min = parse_number(&min)?;

    let max: String = Input::new()
        .with_prompt("Maximum (leave empty for minimum only)")
        .allow_empty(true)
        .interact_text()?;
    let max = match max.trim() {
        "" => None,
        text => Some(parse_number(text)?),
    };

    Ok((min, max))
}

/// Prompt for a number, offering `current` as the default.
fn prompt_number(prompt: &str, current: f64) -> Result<f64> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .default(format!("{}", current))
        .interact_text()?;
    parse_number(&input)
}

/// Prompt for the category of a new ingredient. Defaults to "Other".
pub fn prompt_category() -> Result<IngredientCategory> {
    let options: Vec<&str> = IngredientCategory::ALL
        .iter()
        .map(|c| c.display_name())
        .collect();
    let default = IngredientCategory::ALL
        .iter()
        .position(|c| *c == IngredientCategory::default())
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Category")
        .items(&options)
        .default(default)
        .interact()?;
    Ok(IngredientCategory::ALL[selection])
}

/// Edit an ingredient field by field. Enter keeps the current value.
///
/// Feeds are asked for every nutrient; enzymes for their dosage and matrix.
pub fn prompt_ingredient_details(ingredient: &Ingredient) -> Result<Ingredient> {
    let mut edited = ingredient.clone();

    let name: String = Input::new()
        .with_prompt("Name")
        .default(ingredient.name.clone())
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if input.trim().is_empty() {
                Err("Name cannot be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    edited.name = name.trim().to_string();

    edited.description = Input::new()
        .with_prompt("Description")
        .with_initial_text(ingredient.description.clone())
        .allow_empty(true)
        .interact_text()?;

    let price = prompt_number("Price (USD/ton)", ingredient.price_per_ton)?;
    edited.set_field("Price_USD_per_ton", price)?;

    match &ingredient.kind {
        IngredientKind::Enzyme(profile) => {
            edited.kind = IngredientKind::Enzyme(prompt_enzyme_profile(profile)?);
        }
        IngredientKind::Feed(_) => prompt_nutrients(&mut edited.nutrients)?,
    }

    Ok(edited)
}

/// Edit an enzyme's standard dosage and nutrient matrix.
///
/// Clearing a matrix entry removes that nutrient. A blank or non-positive
/// dosage becomes the default standard dosage.
pub fn prompt_enzyme_profile(profile: &EnzymeProfile) -> Result<EnzymeProfile> {
    let dosage: String = Input::new()
        .with_prompt("Standard dosage (g/ton)")
        .with_initial_text(
            profile
                .standard_dosage_g_per_ton
                .map(|d| d.to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    let mut entries: Vec<(Nutrient, String)> = Vec::with_capacity(Nutrient::COUNT);
    for nutrient in Nutrient::ALL {
        let current = profile
            .matrix
            .as_ref()
            .and_then(|matrix| matrix.get(&nutrient))
            .map(|v| v.to_string())
            .unwrap_or_default();

        let text: String = Input::new()
            .with_prompt(format!("Matrix {} ({})", nutrient.label(), nutrient.base_unit()))
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        entries.push((nutrient, text));
    }

    Ok(EnzymeProfile::from_entries(
        &dosage,
        entries.iter().map(|(nutrient, text)| (*nutrient, text.as_str())),
    ))
}

fn prompt_nutrients(nutrients: &mut NutrientValues) -> Result<()> {
    for nutrient in Nutrient::ALL {
        let prompt = format!("{} ({})", nutrient.label(), nutrient.base_unit());
        let value = prompt_number(&prompt, nutrients.get(nutrient))?;
        nutrients.set(nutrient, value);
    }
    Ok(())
}

/// Steps offered by the mix editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixEditAction {
    EditInclusions,
    OverrideRow,
    AddIngredients,
    RemoveIngredient,
    Done,
}

impl MixEditAction {
    pub const ALL: [MixEditAction; 5] = [
        MixEditAction::EditInclusions,
        MixEditAction::OverrideRow,
        MixEditAction::AddIngredients,
        MixEditAction::RemoveIngredient,
        MixEditAction::Done,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MixEditAction::EditInclusions => "Edit inclusions",
            MixEditAction::OverrideRow => "Override price or nutrients of a row",
            MixEditAction::AddIngredients => "Add ingredients from the catalog",
            MixEditAction::RemoveIngredient => "Remove an ingredient",
            MixEditAction::Done => "Done",
        }
    }
}

pub fn prompt_mix_action() -> Result<MixEditAction> {
    let options: Vec<&str> = MixEditAction::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt("What next?")
        .items(&options)
        .default(0)
        .interact()?;
    Ok(MixEditAction::ALL[selection])
}

/// Pick one row of the mix. `None` when the mix is empty or the user cancels.
pub fn prompt_mix_row(mix: &[Ingredient], prompt: &str) -> Result<Option<usize>> {
    if mix.is_empty() {
        println!("The mix is empty.");
        return Ok(None);
    }

    let mut options: Vec<String> = mix.iter().map(|i| i.name.clone()).collect();
    options.push("Cancel".to_string());

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&options)
        .default(0)
        .interact()?;
    Ok((selection < mix.len()).then_some(selection))
}

/// Override numeric fields of one mix row by record key, e.g.
/// `Price_USD_per_ton` or `CP_pct`, until an empty field name is entered.
pub fn prompt_row_overrides(ingredient: &mut Ingredient) -> Result<()> {
    loop {
        let field: String = Input::new()
            .with_prompt(format!(
                "Field to change for {} (or press Enter to finish)",
                ingredient.name
            ))
            .allow_empty(true)
            .interact_text()?;
        let field = field.trim();
        if field.is_empty() {
            return Ok(());
        }

        let value: String = Input::new()
            .with_prompt(format!("New value for {}", field))
            .interact_text()?;
        match parse_number(&value).and_then(|value| ingredient.set_field(field, value)) {
            Ok(()) => println!("{} updated.", field),
            Err(e) => println!("{}", e),
        }
    }
}

/// Prompt for yes/no confirmation.
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 12.5 ").unwrap(), 12.5);
        assert!(parse_number("abc").is_err());
        assert!(parse_number("inf").is_err());
    }
}

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{FeedError, Result};
use crate::models::{FeedAnalysis, Ingredient, IngredientKind, Nutrient};
use crate::units::{base_unit, ReportField};

const TEXT_COLUMNS: [&str; 3] = ["Name", "description", "category"];
const NUMERIC_COLUMNS: [&str; 3] = [
    "Inclusion_pct",
    "Price_USD_per_ton",
    "standard_dosage_g_per_ton",
];

/// Load an ingredient list (catalog or mix) from a JSON file.
pub fn load_ingredients<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let content = fs::read_to_string(path)?;
    let ingredients: Vec<Ingredient> = serde_json::from_str(&content)?;
    Ok(ingredients)
}

/// Save an ingredient list as pretty-printed JSON.
pub fn save_ingredients<P: AsRef<Path>>(path: P, ingredients: &[Ingredient]) -> Result<()> {
    let json = serde_json::to_string_pretty(ingredients)?;
    fs::write(path.as_ref(), json)?;
    tracing::info!(path = %path.as_ref().display(), count = ingredients.len(), "saved ingredients");
    Ok(())
}

/// Load ingredients from `.csv` or JSON depending on the extension.
pub fn load_any<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let is_csv = path
        .as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        import_csv(path)
    } else {
        load_ingredients(path)
    }
}

fn csv_headers() -> Vec<String> {
    let mut headers = vec![
        "id".to_string(),
        "Name".to_string(),
        "description".to_string(),
        "category".to_string(),
        "Inclusion_pct".to_string(),
    ];
    headers.extend(Nutrient::ALL.iter().map(|n| n.key().to_string()));
    headers.push("Price_USD_per_ton".to_string());
    headers.push("standard_dosage_g_per_ton".to_string());
    headers.push("matrix".to_string());
    headers
}

/// Write ingredients as CSV, one flat row each. Enzyme matrices are JSON-encoded.
pub fn export_csv<P: AsRef<Path>>(path: P, ingredients: &[Ingredient]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(csv_headers())?;

    for ingredient in ingredients {
        let mut row = vec![
            ingredient.id.to_string(),
            ingredient.name.clone(),
            ingredient.description.clone(),
            ingredient.category().tag().to_string(),
            ingredient.inclusion_pct.to_string(),
        ];
        row.extend(ingredient.nutrients.iter().map(|(_, v)| v.to_string()));
        row.push(ingredient.price_per_ton.to_string());

        match &ingredient.kind {
            IngredientKind::Enzyme(profile) => {
                row.push(
                    profile
                        .standard_dosage_g_per_ton
                        .map(|d| d.to_string())
                        .unwrap_or_default(),
                );
                row.push(match &profile.matrix {
                    Some(matrix) => serde_json::to_string(matrix)?,
                    None => String::new(),
                });
            }
            IngredientKind::Feed(_) => {
                row.push(String::new());
                row.push(String::new());
            }
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn csv_cell_to_json(header: &str, cell: &str, line: u64) -> Result<Option<Value>> {
    let cell = cell.trim();
    if TEXT_COLUMNS.contains(&header) {
        return Ok(Some(Value::String(cell.to_string())));
    }
    if cell.is_empty() {
        return Ok(None);
    }

    match header {
        "matrix" => Ok(Some(serde_json::from_str(cell)?)),
        "id" => {
            let id: u64 = cell.parse().map_err(|_| {
                FeedError::InvalidInput(format!("line {}: invalid id '{}'", line, cell))
            })?;
            Ok(Some(Value::from(id)))
        }
        _ if NUMERIC_COLUMNS.contains(&header) || header.parse::<Nutrient>().is_ok() => {
            let number: f64 = cell.parse().map_err(|_| {
                FeedError::InvalidInput(format!(
                    "line {}: invalid number '{}' in {}",
                    line, cell, header
                ))
            })?;
            Ok(serde_json::Number::from_f64(number).map(Value::Number))
        }
        _ => Ok(None),
    }
}

/// Read ingredients from a CSV file with the flat column layout.
///
/// Missing numeric cells default to 0; unknown columns are ignored.
pub fn import_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Ingredient>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut ingredients = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row as u64 + 2;
        let mut object = Map::new();
        for (header, cell) in headers.iter().zip(record.iter()) {
            if let Some(value) = csv_cell_to_json(header, cell, line)? {
                object.insert(header.to_string(), value);
            }
        }
        ingredients.push(serde_json::from_value(Value::Object(object))?);
    }

    Ok(ingredients)
}

/// Write an analysis as `key,label,value,unit` rows (costs first).
pub fn export_analysis_csv<P: AsRef<Path>>(path: P, analysis: &FeedAnalysis) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["key", "label", "value", "unit"])?;

    let costs = [
        (ReportField::CostPerTon, analysis.total_cost_per_ton),
        (ReportField::CostPer100kg, analysis.total_cost_per_100kg),
    ];
    let metrics = analysis
        .nutrients
        .iter()
        .map(|(metric, value)| (ReportField::Metric(*metric), *value));

    for (field, value) in costs.into_iter().chain(metrics) {
        writer.write_record([
            field.key(),
            field.label().to_string(),
            value.to_string(),
            base_unit(field).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedCategory, IngredientCategory};
    use std::collections::BTreeMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_ingredients() -> Vec<Ingredient> {
        let matrix = BTreeMap::from([(Nutrient::MetabolizableEnergy, 75.0)]);
        vec![
            Ingredient::feed(1, "Yellow Corn", FeedCategory::Energy)
                .with_inclusion(60.0)
                .with_price(325.0)
                .with_nutrient(Nutrient::CrudeProtein, 7.8),
            Ingredient::enzyme(101, "Xylanase", 50.0, matrix)
                .with_inclusion(0.005)
                .with_price(12_000.0),
        ]
    }

    #[test]
    fn test_json_roundtrip_keeps_duplicates() {
        let mut ingredients = sample_ingredients();
        ingredients.push(ingredients[0].clone());

        let file = NamedTempFile::new().unwrap();
        save_ingredients(file.path(), &ingredients).unwrap();
        let reloaded = load_ingredients(file.path()).unwrap();

        assert_eq!(reloaded, ingredients);
    }

    #[test]
    fn test_csv_roundtrip() {
        let ingredients = sample_ingredients();
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

        export_csv(file.path(), &ingredients).unwrap();
        let reloaded = load_any(file.path()).unwrap();

        assert_eq!(reloaded, ingredients);
    }

    #[test]
    fn test_csv_import_defaults_missing_cells() {
        let csv = "id,Name,category,CP_pct,Legacy\n7,Barley,Energy,11.5,x\n8,Salt,MineralSupplements,,\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let ingredients = import_csv(file.path()).unwrap();
        assert_eq!(ingredients.len(), 2);
        assert!((ingredients[0].nutrients.get(Nutrient::CrudeProtein) - 11.5).abs() < 1e-12);
        assert!(ingredients[1].nutrients.is_zero());
    }

    #[test]
    fn test_csv_import_accepts_loose_categories() {
        let csv = "id,Name,category,CP_pct\n7,Barley,energy,11.5\n8,Binder,,\n9,Phytase,enzymes,\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        let ingredients = import_csv(file.path()).unwrap();
        assert_eq!(ingredients[0].category(), IngredientCategory::Energy);
        assert_eq!(ingredients[1].category(), IngredientCategory::Other);
        assert!(ingredients[2].is_enzyme());
    }

    #[test]
    fn test_csv_import_rejects_bad_numbers() {
        let csv = "id,Name,category,CP_pct\n7,Barley,Energy,lots\n";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(csv.as_bytes()).unwrap();

        assert!(matches!(import_csv(file.path()), Err(FeedError::InvalidInput(_))));
    }

    #[test]
    fn test_analysis_export_rows() {
        let analysis = crate::analysis::analyze_feed(&sample_ingredients());
        let file = NamedTempFile::new().unwrap();
        export_analysis_csv(file.path(), &analysis).unwrap();

        let mut reader = csv::Reader::from_path(file.path()).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2 + analysis.nutrients.len());
        assert_eq!(&rows[0][0], "totalCostPerTon");
        assert_eq!(&rows[2][0], "nutrients.CP_pct");
    }
}

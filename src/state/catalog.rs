use std::collections::HashMap;

use strsim::jaro_winkler;

use crate::error::{FeedError, Result};
use crate::models::Ingredient;

/// Minimum Jaro-Winkler score for a name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.7;
const MAX_SUGGESTIONS: usize = 5;

const DEFAULT_CATALOG_JSON: &str = include_str!("../../data/default_catalog.json");

/// Outcome of merging imported ingredients into a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeSummary {
    pub updated: usize,
    pub added: usize,
}

/// The master ingredient database mixes are assembled from.
///
/// Keeps catalog order; ids are unique.
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: Vec<Ingredient>,
}

impl IngredientCatalog {
    /// Build a catalog; later records with an already used id get a fresh one.
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        let mut catalog = Self::default();
        for ingredient in ingredients {
            if catalog.get(ingredient.id).is_some() {
                catalog.add(ingredient);
            } else {
                catalog.ingredients.push(ingredient);
            }
        }
        catalog
    }

    /// The built-in catalog of feed ingredients and enzymes.
    pub fn default_catalog() -> Result<Self> {
        let ingredients: Vec<Ingredient> = serde_json::from_str(DEFAULT_CATALOG_JSON)?;
        Ok(Self::new(ingredients))
    }

    pub fn get(&self, id: u64) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id == id)
    }

    /// Case-insensitive exact name lookup.
    pub fn find_by_name(&self, name: &str) -> Option<&Ingredient> {
        let key = name.trim().to_lowercase();
        self.ingredients.iter().find(|i| i.key() == key)
    }

    /// Closest names to `query`, best first.
    pub fn suggest(&self, query: &str) -> Vec<&Ingredient> {
        let query = query.trim().to_lowercase();
        let mut candidates: Vec<(&Ingredient, f64)> = self
            .ingredients
            .iter()
            .map(|i| (i, jaro_winkler(&i.key(), &query)))
            .filter(|(_, score)| *score > SUGGESTION_THRESHOLD)
            .collect();

        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(i, _)| i)
            .collect()
    }

    fn next_id(&self) -> u64 {
        self.ingredients.iter().map(|i| i.id).max().map_or(1, |id| id + 1)
    }

    /// Add an ingredient under a fresh id and return that id.
    pub fn add(&mut self, mut ingredient: Ingredient) -> u64 {
        ingredient.id = self.next_id();
        let id = ingredient.id;
        self.ingredients.push(ingredient);
        id
    }

    /// Replace the ingredient with the same id.
    pub fn update(&mut self, ingredient: Ingredient) -> Result<()> {
        let slot = self
            .ingredients
            .iter_mut()
            .find(|i| i.id == ingredient.id)
            .ok_or(FeedError::IngredientNotFound(ingredient.id))?;
        *slot = ingredient;
        Ok(())
    }

    /// Merge imported ingredients, matching on trimmed lowercase name.
    ///
    /// Matches are replaced but keep their catalog id; unmatched records are
    /// added with fresh ids. Records without a name are skipped.
    pub fn merge(&mut self, imported: Vec<Ingredient>) -> MergeSummary {
        let mut summary = MergeSummary::default();

        for mut ingredient in imported {
            if ingredient.name.trim().is_empty() {
                tracing::warn!(id = ingredient.id, "skipping imported ingredient without a name");
                continue;
            }

            let key = ingredient.key();
            match self.ingredients.iter_mut().find(|i| i.key() == key) {
                Some(existing) => {
                    ingredient.id = existing.id;
                    *existing = ingredient;
                    summary.updated += 1;
                }
                None => {
                    self.add(ingredient);
                    summary.added += 1;
                }
            }
        }

        tracing::info!(
            updated = summary.updated,
            added = summary.added,
            "merged imported ingredients"
        );
        summary
    }

    /// Build a mix from catalog ids.
    ///
    /// Ingredients already in `current_mix` keep their inclusion; new ones
    /// start at 0 %. Catalog order is preserved.
    pub fn select(&self, ids: &[u64], current_mix: &[Ingredient]) -> Result<Vec<Ingredient>> {
        if let Some(missing) = ids.iter().find(|id| self.get(**id).is_none()) {
            return Err(FeedError::IngredientNotFound(*missing));
        }

        let existing: HashMap<u64, &Ingredient> = current_mix.iter().map(|i| (i.id, i)).collect();

        Ok(self
            .ingredients
            .iter()
            .filter(|i| ids.contains(&i.id))
            .map(|i| match existing.get(&i.id) {
                Some(current) => (*current).clone(),
                None => i.clone().with_inclusion(0.0),
            })
            .collect())
    }

    /// Append catalog ingredients to a mix at 0 %.
    ///
    /// Rows already in the mix stay as they are, including ones the catalog
    /// does not know.
    pub fn add_to_mix(&self, ids: &[u64], mix: &[Ingredient]) -> Result<Vec<Ingredient>> {
        let new_ids: Vec<u64> = ids
            .iter()
            .copied()
            .filter(|id| mix.iter().all(|i| i.id != *id))
            .collect();

        let mut extended = mix.to_vec();
        extended.extend(self.select(&new_ids, mix)?);
        Ok(extended)
    }

    pub fn enzymes(&self) -> Vec<&Ingredient> {
        self.ingredients.iter().filter(|i| i.is_enzyme()).collect()
    }

    pub fn all(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn to_ingredients(&self) -> Vec<Ingredient> {
        self.ingredients.clone()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedCategory, Nutrient};

    fn sample_catalog() -> IngredientCatalog {
        IngredientCatalog::new(vec![
            Ingredient::feed(1, "Yellow Corn", FeedCategory::Energy)
                .with_inclusion(60.0)
                .with_nutrient(Nutrient::CrudeProtein, 7.8),
            Ingredient::feed(2, "Soybean Meal 44%", FeedCategory::Protein).with_inclusion(30.0),
        ])
    }

    #[test]
    fn test_default_catalog_loads() {
        let catalog = IngredientCatalog::default_catalog().unwrap();
        assert_eq!(catalog.len(), 41);
        assert_eq!(catalog.enzymes().len(), 4);
        assert!(catalog.find_by_name("yellow corn").is_some());
    }

    #[test]
    fn test_duplicate_ids_reassigned() {
        let catalog = IngredientCatalog::new(vec![
            Ingredient::feed(1, "A", FeedCategory::Energy),
            Ingredient::feed(1, "B", FeedCategory::Energy),
        ]);
        assert_eq!(catalog.find_by_name("b").unwrap().id, 2);
    }

    #[test]
    fn test_suggest_fuzzy() {
        let catalog = sample_catalog();
        let suggestions = catalog.suggest("yelow corn");
        assert_eq!(suggestions[0].id, 1);
        assert!(catalog.suggest("zzzz").is_empty());
    }

    #[test]
    fn test_update_missing_errors() {
        let mut catalog = sample_catalog();
        let ghost = Ingredient::feed(99, "Ghost", FeedCategory::Other);
        assert!(matches!(catalog.update(ghost), Err(FeedError::IngredientNotFound(99))));
    }

    #[test]
    fn test_merge_updates_by_name_and_adds_new() {
        let mut catalog = sample_catalog();
        let imported = vec![
            Ingredient::feed(500, "  YELLOW corn ", FeedCategory::Energy)
                .with_nutrient(Nutrient::CrudeProtein, 8.2),
            Ingredient::feed(501, "Wheat", FeedCategory::Energy),
            Ingredient::feed(502, "   ", FeedCategory::Energy),
        ];

        let summary = catalog.merge(imported);

        assert_eq!(summary, MergeSummary { updated: 1, added: 1 });
        let corn = catalog.get(1).unwrap();
        assert!((corn.nutrients.get(Nutrient::CrudeProtein) - 8.2).abs() < 1e-12);
        assert_eq!(catalog.find_by_name("wheat").unwrap().id, 3);
    }

    #[test]
    fn test_select_keeps_existing_inclusions() {
        let catalog = sample_catalog();
        let current = vec![catalog.get(2).unwrap().clone().with_inclusion(25.0)];

        let mix = catalog.select(&[1, 2], &current).unwrap();

        assert_eq!(mix.len(), 2);
        assert_eq!(mix[0].inclusion_pct, 0.0);
        assert_eq!(mix[1].inclusion_pct, 25.0);
        assert!(catalog.select(&[42], &[]).is_err());
    }

    #[test]
    fn test_add_to_mix_appends_new_rows() {
        let catalog = sample_catalog();
        let custom = Ingredient::feed(77, "Farm Premix", FeedCategory::Other).with_inclusion(2.0);
        let current = vec![
            catalog.get(2).unwrap().clone().with_inclusion(30.0).with_price(480.0),
            custom,
        ];

        let mix = catalog.add_to_mix(&[2, 1], &current).unwrap();

        assert_eq!(mix.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 77, 1]);
        assert_eq!(mix[0].price_per_ton, 480.0);
        assert_eq!(mix[2].inclusion_pct, 0.0);
        assert_eq!(current.len(), 2);
        assert!(catalog.add_to_mix(&[42], &current).is_err());
    }
}

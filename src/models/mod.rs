pub mod analysis;
pub mod ingredient;

pub use analysis::{DerivedIndex, EnzymeContribution, FeedAnalysis, Metric};
pub use ingredient::{
    EnzymeProfile, FeedCategory, Ingredient, IngredientCategory, IngredientKind, Nutrient,
    NutrientValues,
};

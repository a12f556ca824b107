mod catalog;
mod persistence;
mod settings;

pub use catalog::{IngredientCatalog, MergeSummary};
pub use persistence::{
    export_analysis_csv, export_csv, import_csv, load_any, load_ingredients, save_ingredients,
};
pub use settings::{AnalysisSettings, JsonFileStore, MemoryStore, SettingsStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Ingredient not found: {0}")]
    IngredientNotFound(u64),

    #[error("Unknown nutrient: {0}")]
    UnknownNutrient(String),

    #[error("Unknown report field: {0}")]
    UnknownField(String),

    #[error("Invalid recommendation override for {field}: {reason}")]
    InvalidOverride { field: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, FeedError>;

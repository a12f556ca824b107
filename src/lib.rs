pub mod analysis;
pub mod cli;
pub mod error;
pub mod interface;
pub mod logging;
pub mod models;
pub mod recommend;
pub mod state;
pub mod units;

pub use analysis::analyze_feed;
pub use error::{FeedError, Result};
pub use models::{FeedAnalysis, Ingredient};

pub mod compare;
pub mod profile;

pub use compare::{classify, compare, deviation, NutrientComparison, RangeStatus, NUTRIENT_GROUPS};
pub use profile::{
    effective_profile, ross_308_profile, GrowthPhase, Recommendation, RecommendationOverride,
    RecommendationOverrides, RecommendationProfile, ROSS_308_RECOMMENDATIONS,
};

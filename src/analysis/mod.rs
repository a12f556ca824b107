pub mod blend;
pub mod constants;
pub mod enzyme;
pub mod mix;

pub use blend::{analyze_feed, blend_base_profile, blend_cost_per_ton, derived_index, total_inclusion};
pub use constants::*;
pub use enzyme::{
    actual_dosage_g_per_ton, apply_enzymes, dose_response_ratio, enzyme_uplift, EnzymeUplift,
};
pub use mix::{needs_normalization, normalize_inclusions, InclusionMode};

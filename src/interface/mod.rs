pub mod prompts;
pub mod render;

pub use prompts::{
    edit_inclusions, prompt_category, prompt_enzyme_profile, prompt_inclusion,
    prompt_ingredient_details, prompt_ingredient_picks, prompt_mix_action, prompt_mix_row,
    prompt_override, prompt_row_overrides, prompt_yes_no, MixEditAction,
};
pub use render::{
    display_analysis, display_catalog, display_comparison, display_enzyme_contributions,
    display_mix, display_normalization_warning, display_settings, format_field,
};

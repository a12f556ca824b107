/// Grams per ton represented by 1 % inclusion (1 % of a ton = 10 kg).
pub const GRAMS_PER_TON_PER_PCT: f64 = 10_000.0;

/// Kilograms per ton represented by 1 % inclusion.
pub const KG_PER_TON_PER_PCT: f64 = 10.0;

/// Smallest per-nutrient enzyme contribution worth recording.
pub const CONTRIBUTION_EPSILON: f64 = 1e-6;

/// Maximum dose-response ratio; enzyme effect plateaus at the standard dosage.
pub const MAX_DOSE_RESPONSE_RATIO: f64 = 1.0;

/// Standard dosage given to an enzyme whose entered dosage is missing or not positive.
pub const DEFAULT_STANDARD_DOSAGE_G_PER_TON: f64 = 100.0;

/// Inclusion rates are percentages of the whole mix.
pub const PERCENT_BASE: f64 = 100.0;

/// Tons to 100 kg batches.
pub const COST_PER_100KG_DIVISOR: f64 = 10.0;

// ─────────────────────────────────────────────────────────────────────────────
// Dietary electrolyte balance (mEq/kg) per 1 % of each mineral
// ─────────────────────────────────────────────────────────────────────────────

pub const DEB_SODIUM_FACTOR: f64 = 434.78;
pub const DEB_POTASSIUM_FACTOR: f64 = 256.4;
pub const DEB_CHLORIDE_FACTOR: f64 = 281.69;

// ─────────────────────────────────────────────────────────────────────────────
// Mix checks
// ─────────────────────────────────────────────────────────────────────────────

/// Allowed deviation of total inclusion from 100 % before a mix is flagged.
pub const INCLUSION_TOLERANCE_PCT: f64 = 0.1;

/// Tolerance band around recommendation bounds for the "borderline" status.
pub const RANGE_TOLERANCE: f64 = 0.05;

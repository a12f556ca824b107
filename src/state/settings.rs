use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::analysis::InclusionMode;
use crate::error::{FeedError, Result};
use crate::models::Metric;
use crate::recommend::{
    effective_profile, GrowthPhase, RecommendationOverride, RecommendationOverrides,
    RecommendationProfile,
};
use crate::units::{self, ReportField};

pub const KEY_GROWTH_PHASE: &str = "growthPhase";
pub const KEY_INCLUSION_MODE: &str = "inclusionMode";
pub const KEY_OVERRIDES: &str = "recommendationOverrides";
pub const KEY_UNITS: &str = "nutrientUnits";
pub const KEY_VISIBILITY: &str = "nutrientVisibility";

/// Key-value storage for persisted preferences. Values are JSON text.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store, used by tests and one-off runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object file, rewritten on every `set`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open a store; a missing file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}

fn read_value<T: DeserializeOwned>(store: &dyn SettingsStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(text) => Ok(Some(serde_json::from_str(&text)?)),
        None => Ok(None),
    }
}

/// Parse the keys of a stored map. Keys that no longer name a field are dropped with a warning.
fn known_keys<K, V>(stored: BTreeMap<String, V>, setting: &str) -> Vec<(K, V)>
where
    K: FromStr,
    K::Err: Display,
{
    stored
        .into_iter()
        .filter_map(|(key, value)| match key.parse::<K>() {
            Ok(parsed) => Some((parsed, value)),
            Err(e) => {
                tracing::warn!(setting, key = %key, error = %e, "dropping stored entry");
                None
            }
        })
        .collect()
}

fn write_value<T: Serialize>(store: &mut dyn SettingsStore, key: &str, value: &T) -> Result<()> {
    store.set(key, serde_json::to_string(value)?)
}

/// User preferences for comparing and displaying analyses.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    pub growth_phase: GrowthPhase,
    pub inclusion_mode: InclusionMode,
    pub overrides: RecommendationOverrides,
    pub units: BTreeMap<ReportField, String>,
    pub visibility: BTreeMap<ReportField, bool>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            growth_phase: GrowthPhase::default(),
            inclusion_mode: InclusionMode::default(),
            overrides: RecommendationOverrides::new(),
            units: ReportField::all()
                .map(|f| (f, units::base_unit(f).to_string()))
                .collect(),
            visibility: ReportField::all().map(|f| (f, true)).collect(),
        }
    }
}

impl AnalysisSettings {
    /// Load settings; absent keys keep their defaults.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(phase) = read_value(store, KEY_GROWTH_PHASE)? {
            settings.growth_phase = phase;
        }
        if let Some(mode) = read_value(store, KEY_INCLUSION_MODE)? {
            settings.inclusion_mode = mode;
        }
        if let Some(stored) = read_value(store, KEY_OVERRIDES)? {
            let stored = known_keys::<Metric, RecommendationOverride>(stored, KEY_OVERRIDES);
            for (metric, bounds) in stored {
                match RecommendationOverride::new(metric, bounds.min, bounds.max) {
                    Ok(valid) => {
                        settings.overrides.insert(metric, valid);
                    }
                    Err(e) => tracing::warn!(error = %e, "dropping stored override"),
                }
            }
        }
        if let Some(stored) = read_value(store, KEY_UNITS)? {
            for (field, unit) in known_keys::<ReportField, String>(stored, KEY_UNITS) {
                if units::is_valid_unit(field, &unit) {
                    settings.units.insert(field, unit);
                } else {
                    tracing::warn!(field = %field, unit = %unit, "dropping stored unit");
                }
            }
        }
        if let Some(stored) = read_value(store, KEY_VISIBILITY)? {
            settings
                .visibility
                .extend(known_keys::<ReportField, bool>(stored, KEY_VISIBILITY));
        }

        Ok(settings)
    }

    pub fn save(&self, store: &mut dyn SettingsStore) -> Result<()> {
        write_value(store, KEY_GROWTH_PHASE, &self.growth_phase)?;
        write_value(store, KEY_INCLUSION_MODE, &self.inclusion_mode)?;
        write_value(store, KEY_OVERRIDES, &self.overrides)?;
        write_value(store, KEY_UNITS, &self.units)?;
        write_value(store, KEY_VISIBILITY, &self.visibility)?;
        Ok(())
    }

    pub fn unit_for(&self, field: ReportField) -> &str {
        self.units
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| units::base_unit(field))
    }

    pub fn set_unit(&mut self, field: ReportField, unit: &str) -> Result<()> {
        if !units::is_valid_unit(field, unit) {
            return Err(FeedError::InvalidInput(format!(
                "'{}' is not a unit of {} (choose from: {})",
                unit,
                field,
                units::available_units(field).join(", ")
            )));
        }
        self.units.insert(field, unit.to_string());
        Ok(())
    }

    pub fn is_visible(&self, field: ReportField) -> bool {
        self.visibility.get(&field).copied().unwrap_or(true)
    }

    pub fn set_visible(&mut self, field: ReportField, visible: bool) {
        self.visibility.insert(field, visible);
    }

    pub fn set_override(&mut self, metric: Metric, min: f64, max: Option<f64>) -> Result<()> {
        let bounds = RecommendationOverride::new(metric, min, max)?;
        self.overrides.insert(metric, bounds);
        Ok(())
    }

    /// Revert one metric to its built-in recommendation.
    pub fn clear_override(&mut self, metric: Metric) -> bool {
        self.overrides.remove(&metric).is_some()
    }

    pub fn reset_overrides(&mut self) {
        self.overrides.clear();
    }

    pub fn overridden_metrics(&self) -> BTreeSet<Metric> {
        self.overrides.keys().copied().collect()
    }

    /// Recommendation profile for the selected phase with overrides applied.
    pub fn profile(&self) -> RecommendationProfile {
        effective_profile(self.growth_phase, &self.overrides)
    }
}

//! TOML-based forecast configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::MIN_SEED_ROWS;
use crate::forecast::EngineConfig;
use crate::model::EnsembleWeights;

/// Tolerance on the ensemble weight sum.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Top-level forecast configuration parsed from TOML.
///
/// All fields have defaults matching the `nordic` preset. Load from TOML
/// with [`ForecastConfig::from_toml_file`] or pick a preset with
/// [`ForecastConfig::from_preset`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Horizon and seed requirements.
    #[serde(default)]
    pub engine: EngineSection,
    /// Blend weights of the three model families.
    #[serde(default)]
    pub ensemble: EnsembleWeights,
    /// Input and output directories.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Which cities to run and how to read their tables.
    #[serde(default)]
    pub data: DataConfig,
}

/// Horizon and seed requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSection {
    /// Days to forecast (must be > 0).
    pub horizon_days: usize,
    /// Floor on seed history rows; the feature schema may require more.
    pub min_seed_rows: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            horizon_days: 7,
            min_seed_rows: MIN_SEED_ROWS,
        }
    }
}

/// Input and output directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Holds `<city>_features.csv`.
    pub feature_dir: PathBuf,
    /// Holds `<kind>_<target>_<city>.json`.
    pub model_dir: PathBuf,
    /// Receives `forecast_<city>.csv`.
    pub forecast_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            feature_dir: PathBuf::from("data/features"),
            model_dir: PathBuf::from("models"),
            forecast_dir: PathBuf::from("data/forecast"),
        }
    }
}

/// Which cities to run and how to read their tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Cities to forecast, in output order.
    pub cities: Vec<String>,
    /// Columns dropped from feature tables before they reach the models.
    pub exclude_columns: Vec<String>,
    /// Run cities on the rayon pool instead of one after another.
    pub parallel: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cities: ["oslo", "stockholm", "copenhagen"].map(String::from).to_vec(),
            exclude_columns: ["demand_next", "price_next", "name", "description"]
                .map(String::from)
                .to_vec(),
            parallel: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"engine.horizon_days"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ForecastConfig {
    /// Available preset names.
    pub const PRESETS: &[&str] = &["nordic", "smoke"];

    /// Three Nordic cities, one-week horizon.
    pub fn nordic() -> Self {
        Self::default()
    }

    /// One city, three days. Quick end-to-end check of a model directory.
    pub fn smoke() -> Self {
        Self {
            engine: EngineSection {
                horizon_days: 3,
                ..EngineSection::default()
            },
            data: DataConfig {
                cities: vec!["oslo".to_string()],
                ..DataConfig::default()
            },
            ..Self::default()
        }
    }

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "nordic" => Ok(Self::nordic()),
            "smoke" => Ok(Self::smoke()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Engine settings for one run. The forecast starts the day after history.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_seed_rows: self.engine.min_seed_rows,
            start_date: None,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.engine.horizon_days == 0 {
            errors.push(ConfigError::new("engine.horizon_days", "must be > 0"));
        }
        if self.engine.min_seed_rows < MIN_SEED_ROWS {
            errors.push(ConfigError::new(
                "engine.min_seed_rows",
                format!("must be >= {MIN_SEED_ROWS}"),
            ));
        }

        let w = &self.ensemble;
        for (field, value) in [
            ("ensemble.linear", w.linear),
            ("ensemble.forest", w.forest),
            ("ensemble.boosted", w.boosted),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::new(field, "must be a finite value >= 0"));
            }
        }
        if (w.sum() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(ConfigError::new(
                "ensemble",
                format!("weights must sum to 1.0, got {}", w.sum()),
            ));
        }

        let d = &self.data;
        if d.cities.is_empty() {
            errors.push(ConfigError::new("data.cities", "must list at least one city"));
        }
        if let Some(blank) = d.cities.iter().position(|c| c.trim().is_empty()) {
            errors.push(ConfigError::new(
                format!("data.cities[{blank}]"),
                "must not be blank",
            ));
        }

        errors
    }
}

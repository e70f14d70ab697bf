//! Command-line interface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::{ConfigError, ForecastConfig};

/// Recursive day-ahead demand and price forecasting.
#[derive(Debug, Parser)]
#[command(name = "grid-forecast", author, version, about, long_about = None)]
pub struct Cli {
    /// Load configuration from a TOML file (takes priority over --preset)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use a built-in preset (nordic, smoke)
    #[arg(long, global = true)]
    pub preset: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast every configured city and write forecast_<city>.csv
    Forecast {
        /// Days to forecast
        #[arg(short, long)]
        days: Option<usize>,

        /// City to forecast (repeatable; replaces the configured list)
        #[arg(short, long = "city")]
        cities: Vec<String>,

        /// Directory for forecast CSVs
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Run cities in parallel
        #[arg(short, long)]
        parallel: bool,
    },
    /// Backtest each model, the ensemble and the naive baseline on held-out days
    Evaluate {
        /// City to evaluate (repeatable; replaces the configured list)
        #[arg(short, long = "city")]
        cities: Vec<String>,

        /// Held-out days (default: 30, or a fifth of a short table)
        #[arg(long)]
        holdout: Option<usize>,

        /// Run cities in parallel
        #[arg(short, long)]
        parallel: bool,
    },
    /// Forecast synthetic history with hand-set models
    Demo {
        /// Days to forecast
        #[arg(short, long)]
        days: Option<usize>,

        /// Seed for the synthetic history
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First day of synthetic history (YYYY-MM-DD)
        #[arg(long, default_value = "2024-01-01")]
        start: NaiveDate,

        /// Days of synthetic history
        #[arg(long, default_value_t = 365)]
        history_days: usize,

        /// Write the forecast and demo model artifacts here
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Resolves the base configuration: `--config`, then `--preset`, then `nordic`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed, or the
    /// preset is unknown.
    pub fn load_config(&self) -> Result<ForecastConfig, ConfigError> {
        if let Some(path) = &self.config {
            ForecastConfig::from_toml_file(path)
        } else if let Some(name) = &self.preset {
            ForecastConfig::from_preset(name)
        } else {
            Ok(ForecastConfig::nordic())
        }
    }

    /// Applies command-line overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut ForecastConfig) {
        match &self.command {
            Command::Forecast {
                days,
                cities,
                out_dir,
                parallel,
            } => {
                if let Some(days) = days {
                    config.engine.horizon_days = *days;
                }
                if !cities.is_empty() {
                    config.data.cities = cities.clone();
                }
                if let Some(dir) = out_dir {
                    config.paths.forecast_dir = dir.clone();
                }
                config.data.parallel |= *parallel;
            }
            Command::Evaluate {
                cities, parallel, ..
            } => {
                if !cities.is_empty() {
                    config.data.cities = cities.clone();
                }
                config.data.parallel |= *parallel;
            }
            Command::Demo { days, .. } => {
                if let Some(days) = days {
                    config.engine.horizon_days = *days;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("grid-forecast").chain(args.iter().copied()))
    }

    #[test]
    fn forecast_overrides_apply() {
        let cli = parse(&[
            "forecast", "--days", "3", "--city", "oslo", "--city", "bergen", "--parallel",
        ])
        .expect("valid args");
        let mut config = ForecastConfig::nordic();
        cli.apply_overrides(&mut config);
        assert_eq!(config.engine.horizon_days, 3);
        assert_eq!(config.data.cities, ["oslo", "bergen"]);
        assert!(config.data.parallel);
    }

    #[test]
    fn global_preset_after_subcommand() {
        let cli = parse(&["evaluate", "--preset", "smoke"]).expect("valid args");
        let config = cli.load_config().expect("known preset");
        assert_eq!(config, ForecastConfig::smoke());
    }

    #[test]
    fn unknown_preset_is_config_error() {
        let cli = parse(&["--preset", "arctic", "forecast"]).expect("valid args");
        assert_eq!(cli.load_config().map_err(|e| e.field), Err("preset".to_string()));
    }

    #[test]
    fn demo_defaults() {
        let cli = parse(&["demo"]).expect("valid args");
        match cli.command {
            Command::Demo {
                seed,
                start,
                history_days,
                ..
            } => {
                assert_eq!(seed, 42);
                assert_eq!(start, NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"));
                assert_eq!(history_days, 365);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["forecast", "--days", "soon"]).is_err());
    }
}

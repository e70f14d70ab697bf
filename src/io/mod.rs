//! File boundary: feature tables in, forecast tables out.

pub mod export;
pub mod table;

pub use export::{export_forecast, forecast_path, write_forecast_csv};
pub use table::{FeatureTable, feature_path, load_feature_table, read_feature_table};

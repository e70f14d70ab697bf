//! Lag, rolling and differencing features derived from history.

pub mod derive;
pub mod schema;
pub mod vector;

pub use derive::derive;
pub use schema::{FeatureRule, FeatureSchema, MIN_SEED_ROWS, SCHEMA_VERSION};
pub use vector::FeatureVector;

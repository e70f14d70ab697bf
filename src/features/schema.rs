//! Versioned, ordered feature schema shared with the training side.

use std::fmt;

use crate::history::observation::{Column, LOAD_HEADER, PRICE_HEADER, TEMP_HEADER};

/// Version of the feature naming and derivation rules below.
///
/// Bump whenever a rule's meaning changes; trained artifacts record the
/// version they were fitted against.
pub const SCHEMA_VERSION: u32 = 1;

/// Minimum number of real rows before recursion may start, whatever the schema.
pub const MIN_SEED_ROWS: usize = 7;

/// How one named feature is derived from history, relative to the day being forecast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureRule {
    /// Value `steps` days before the forecast day.
    Lag { column: Column, steps: usize },
    /// Mean over the `window` days preceding the forecast day.
    Rolling { column: Column, window: usize },
    /// Latest value minus its lag: the previous row for `steps == 1`,
    /// otherwise the `Lag` value for the same `steps`.
    Diff { column: Column, steps: usize },
    /// Latest row's value, carried through unchanged.
    Static { column: Column },
}

impl FeatureRule {
    /// Parses a training column name.
    ///
    /// `<demand|price|temp>_<lag|roll|diff><n>` names become derived rules;
    /// anything else is a static column.
    pub fn parse(name: &str) -> Self {
        Self::parse_derived(name).unwrap_or_else(|| Self::Static {
            column: Column::from_header(name),
        })
    }

    fn parse_derived(name: &str) -> Option<Self> {
        let (prefix, op) = name.split_once('_')?;
        let column = Column::from_feature_prefix(prefix)?;
        let split = op.find(|c: char| c.is_ascii_digit())?;
        let (kind, digits) = op.split_at(split);
        let n: usize = digits.parse().ok()?;
        if n == 0 {
            return None;
        }
        match kind {
            "lag" => Some(Self::Lag { column, steps: n }),
            "roll" => Some(Self::Rolling { column, window: n }),
            "diff" => Some(Self::Diff { column, steps: n }),
            _ => None,
        }
    }

    /// Whether the rule is computed from history rather than read from the latest row.
    pub fn is_derived(&self) -> bool {
        !matches!(self, Self::Static { .. })
    }

    /// Rows of history the rule needs.
    pub fn lookback(&self) -> usize {
        match self {
            Self::Lag { steps, .. } => *steps,
            Self::Rolling { window, .. } => *window,
            Self::Diff { steps, .. } => (*steps).max(2),
            Self::Static { .. } => 1,
        }
    }

    /// Canonical feature name, as it appears in training tables.
    pub fn name(&self) -> String {
        match self {
            Self::Lag { column, steps } => derived_name(column, "lag", *steps),
            Self::Rolling { column, window } => derived_name(column, "roll", *window),
            Self::Diff { column, steps } => derived_name(column, "diff", *steps),
            Self::Static { column } => column.header().to_string(),
        }
    }
}

fn derived_name(column: &Column, op: &str, n: usize) -> String {
    match column.feature_prefix() {
        Some(prefix) => format!("{prefix}_{op}{n}"),
        None => format!("{}_{op}{n}", column.header()),
    }
}

impl fmt::Display for FeatureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ordered list of feature rules.
///
/// The order is the column order the models were trained with and is
/// presented to every scorer unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    version: u32,
    rules: Vec<FeatureRule>,
}

impl FeatureSchema {
    pub fn new(rules: Vec<FeatureRule>) -> Self {
        Self {
            version: SCHEMA_VERSION,
            rules,
        }
    }

    /// Builds the schema from the ordered training feature columns.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        Self::new(
            columns
                .iter()
                .map(|c| FeatureRule::parse(c.as_ref()))
                .collect(),
        )
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn rules(&self) -> &[FeatureRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Feature names in schema order.
    pub fn names(&self) -> Vec<String> {
        self.rules.iter().map(FeatureRule::name).collect()
    }

    /// Largest lookback over all rules.
    pub fn max_lookback(&self) -> usize {
        self.rules.iter().map(FeatureRule::lookback).max().unwrap_or(0)
    }

    /// Seed rows required before the first forecast step.
    pub fn min_seed(&self) -> usize {
        self.max_lookback().max(MIN_SEED_ROWS)
    }
}

impl Default for FeatureSchema {
    /// Raw columns followed by the engineered lag/roll/diff columns, in the
    /// order the feature tables are written.
    fn default() -> Self {
        Self::from_columns(&[
            LOAD_HEADER,
            PRICE_HEADER,
            TEMP_HEADER,
            "demand_lag1",
            "price_lag1",
            "demand_lag7",
            "price_lag7",
            "demand_roll7",
            "price_roll7",
            "temp_roll7",
            "demand_diff1",
            "demand_diff7",
            "price_diff1",
            "price_diff7",
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_derived_names() {
        assert_eq!(
            FeatureRule::parse("demand_lag7"),
            FeatureRule::Lag {
                column: Column::Load,
                steps: 7
            }
        );
        assert_eq!(
            FeatureRule::parse("temp_roll7"),
            FeatureRule::Rolling {
                column: Column::Temp,
                window: 7
            }
        );
        assert_eq!(
            FeatureRule::parse("price_diff1"),
            FeatureRule::Diff {
                column: Column::Price,
                steps: 1
            }
        );
    }

    #[test]
    fn unknown_names_are_static() {
        for name in ["temp_C", "wind_speed", "demand_next", "price_lag0", "humidity_lag1"] {
            assert!(!FeatureRule::parse(name).is_derived(), "{name}");
        }
    }

    #[test]
    fn names_round_trip() {
        let schema = FeatureSchema::default();
        let again = FeatureSchema::from_columns(&schema.names());
        assert_eq!(schema, again);
        assert_eq!(schema.names()[0], "Actual Load");
        assert_eq!(schema.len(), 14);
    }

    #[test]
    fn default_schema_seeds_from_one_week() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.max_lookback(), 7);
        assert_eq!(schema.min_seed(), 7);
    }

    #[test]
    fn diff_lookback_matches_its_lag() {
        let diff = |steps| FeatureRule::Diff {
            column: Column::Load,
            steps,
        };
        assert_eq!(diff(1).lookback(), 2);
        assert_eq!(diff(2).lookback(), 2);
        assert_eq!(diff(7).lookback(), 7);
    }

    #[test]
    fn min_seed_never_below_a_week() {
        let schema = FeatureSchema::from_columns(&["demand_lag1"]);
        assert_eq!(schema.min_seed(), MIN_SEED_ROWS);
        assert_eq!(schema.version(), SCHEMA_VERSION);
    }
}

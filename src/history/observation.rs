//! Daily observation rows and the columns they expose.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};

/// Header of the demand column in feature tables.
pub const LOAD_HEADER: &str = "Actual Load";
/// Header of the day-ahead price column in feature tables.
pub const PRICE_HEADER: &str = "Price";
/// Header of the temperature column in feature tables.
pub const TEMP_HEADER: &str = "temp_C";

/// A column of an [`Observation`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    /// Electricity demand, observed or synthesized.
    Load,
    /// Day-ahead price, observed or synthesized.
    Price,
    /// Daily mean temperature (°C), exogenous.
    Temp,
    /// Any other exogenous covariate, carried forward unchanged.
    Covariate(String),
}

impl Column {
    /// Maps a feature-table header to its column.
    pub fn from_header(header: &str) -> Self {
        match header {
            LOAD_HEADER => Self::Load,
            PRICE_HEADER => Self::Price,
            TEMP_HEADER => Self::Temp,
            other => Self::Covariate(other.to_string()),
        }
    }

    /// Header used for this column in feature tables.
    pub fn header(&self) -> &str {
        match self {
            Self::Load => LOAD_HEADER,
            Self::Price => PRICE_HEADER,
            Self::Temp => TEMP_HEADER,
            Self::Covariate(name) => name,
        }
    }

    /// Prefix used in derived feature names (`demand_lag1`, `temp_roll7`).
    ///
    /// Covariates have no derived features.
    pub fn feature_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Load => Some("demand"),
            Self::Price => Some("price"),
            Self::Temp => Some("temp"),
            Self::Covariate(_) => None,
        }
    }

    /// Inverse of [`Column::feature_prefix`].
    pub fn from_feature_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "demand" => Some(Self::Load),
            "price" => Some(Self::Price),
            "temp" => Some(Self::Temp),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One day of history: actual or synthesized load and price plus exogenous fields.
///
/// Observations are immutable once built. Forecast steps derive the next row
/// through [`Observation::successor`] instead of mutating a copy in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    date: NaiveDate,
    load: f64,
    price: f64,
    temp_c: f64,
    covariates: BTreeMap<String, f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, load: f64, price: f64, temp_c: f64) -> Self {
        Self {
            date,
            load,
            price,
            temp_c,
            covariates: BTreeMap::new(),
        }
    }

    /// Returns a copy with one more exogenous covariate.
    pub fn with_covariate(mut self, name: impl Into<String>, value: f64) -> Self {
        self.covariates.insert(name.into(), value);
        self
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn temp_c(&self) -> f64 {
        self.temp_c
    }

    pub fn covariates(&self) -> &BTreeMap<String, f64> {
        &self.covariates
    }

    /// Value of `column`, or `None` for an unknown covariate.
    pub fn value(&self, column: &Column) -> Option<f64> {
        match column {
            Column::Load => Some(self.load),
            Column::Price => Some(self.price),
            Column::Temp => Some(self.temp_c),
            Column::Covariate(name) => self.covariates.get(name).copied(),
        }
    }

    /// The following day's row: new load and price, exogenous fields copied forward.
    ///
    /// Returns `None` only when the date would overflow the calendar.
    pub fn successor(&self, load: f64, price: f64) -> Option<Self> {
        let date = self.date.checked_add_days(Days::new(1))?;
        Some(self.carried_to(date, load, price))
    }

    /// A row stamped `date` with new load and price and this row's exogenous fields.
    pub fn carried_to(&self, date: NaiveDate, load: f64, price: f64) -> Self {
        Self {
            date,
            load,
            price,
            temp_c: self.temp_c,
            covariates: self.covariates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    #[test]
    fn headers_round_trip() {
        for header in [LOAD_HEADER, PRICE_HEADER, TEMP_HEADER, "wind_speed"] {
            assert_eq!(Column::from_header(header).header(), header);
        }
    }

    #[test]
    fn successor_copies_exogenous_fields() {
        let obs = Observation::new(day(1), 100.0, 50.0, 4.5).with_covariate("humidity", 80.0);
        let next = obs.successor(101.0, 52.0).expect("date in range");
        assert_eq!(next.date(), day(2));
        assert_eq!(next.load(), 101.0);
        assert_eq!(next.price(), 52.0);
        assert_eq!(next.temp_c(), 4.5);
        assert_eq!(next.value(&Column::Covariate("humidity".into())), Some(80.0));
    }

    #[test]
    fn unknown_covariate_is_none() {
        let obs = Observation::new(day(1), 1.0, 1.0, 1.0);
        assert_eq!(obs.value(&Column::Covariate("cloud".into())), None);
    }
}

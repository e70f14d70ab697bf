//! Reader for per-city historical feature tables.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::debug;

use crate::error::DataError;
use crate::features::{FeatureRule, FeatureSchema};
use crate::history::observation::{LOAD_HEADER, PRICE_HEADER, TEMP_HEADER};
use crate::history::Observation;

/// Header of the date column.
pub const DATE_HEADER: &str = "datetime";

/// Conventional location of a city's feature table inside `dir`.
pub fn feature_path(dir: &Path, city: &str) -> PathBuf {
    dir.join(format!("{city}_features.csv"))
}

/// A city's history as read from disk.
///
/// `columns` lists the numeric feature columns in file order (what a model
/// trained on this table expects). `rows` holds the observations sorted by
/// date. Columns named like derived features (`demand_lag1`) are listed in
/// `columns` but not stored on the rows, since the engine recomputes them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: Vec<Observation>,
}

impl FeatureTable {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Feature schema implied by the table's column order.
    pub fn schema(&self) -> FeatureSchema {
        FeatureSchema::from_columns(&self.columns)
    }
}

/// Opens and parses the feature table at `path`.
///
/// # Errors
///
/// `Io` when the file cannot be opened, otherwise as [`read_feature_table`].
pub fn load_feature_table(path: &Path, exclude: &[String]) -> Result<FeatureTable, DataError> {
    let file = File::open(path).map_err(|e| DataError::io(path, e))?;
    let table = read_feature_table(BufReader::new(file), exclude)?;
    debug!(path = %path.display(), rows = table.len(), columns = table.columns.len(), "loaded feature table");
    Ok(table)
}

/// Parses a feature table from any reader.
///
/// Dates are read from the first ten characters of `datetime`, so both
/// `2024-01-31` and `2024-01-31 00:00:00` work. Columns in `exclude`, blank
/// index columns and columns with any non-numeric value are dropped.
///
/// # Errors
///
/// * `MissingColumn` - `datetime`, `Actual Load`, `Price` or `temp_C` is absent
/// * `InvalidValue` - an unparseable date, or a non-numeric required value
/// * `Csv` - malformed CSV
pub fn read_feature_table(reader: impl Read, exclude: &[String]) -> Result<FeatureTable, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let records = rdr.records().collect::<Result<Vec<StringRecord>, _>>()?;

    let find = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    };
    let date_idx = find(DATE_HEADER)?;
    let load_idx = find(LOAD_HEADER)?;
    let price_idx = find(PRICE_HEADER)?;
    let temp_idx = find(TEMP_HEADER)?;

    let mut columns = Vec::new();
    let mut covariates = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == date_idx || is_index_header(header) || exclude.iter().any(|e| e == header) {
            continue;
        }
        let required = [load_idx, price_idx, temp_idx].contains(&idx);
        if !required && !is_numeric(&records, idx) {
            debug!(column = header, "dropping non-numeric column");
            continue;
        }
        columns.push(header.to_string());
        if !required && !FeatureRule::parse(header).is_derived() {
            covariates.push((idx, header.to_string()));
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let date = parse_date(row, field(record, date_idx))?;
        let number = |idx: usize| parse_number(row, &headers, record, idx);
        let mut obs = Observation::new(date, number(load_idx)?, number(price_idx)?, number(temp_idx)?);
        for (idx, name) in &covariates {
            obs = obs.with_covariate(name.clone(), number(*idx)?);
        }
        rows.push(obs);
    }
    rows.sort_by_key(Observation::date);

    Ok(FeatureTable { columns, rows })
}

fn is_index_header(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:")
}

fn is_numeric(records: &[StringRecord], idx: usize) -> bool {
    records
        .iter()
        .all(|r| field(r, idx).parse::<f64>().is_ok())
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn parse_date(row: usize, raw: &str) -> Result<NaiveDate, DataError> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| DataError::InvalidValue {
        row,
        column: DATE_HEADER.to_string(),
        value: raw.to_string(),
    })
}

fn parse_number(
    row: usize,
    headers: &StringRecord,
    record: &StringRecord,
    idx: usize,
) -> Result<f64, DataError> {
    let raw = field(record, idx);
    raw.parse::<f64>().map_err(|_| DataError::InvalidValue {
        row,
        column: field(headers, idx).to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Column;

    const TABLE: &str = "\
datetime,Actual Load,Price,temp_C,demand_lag1,humidity,name,demand_next
2024-01-02,110.0,51.0,4.0,100.0,80.0,Oslo,120.0
2024-01-01 00:00:00,100.0,50.0,3.5,95.0,82.0,Oslo,110.0
";

    fn exclude() -> Vec<String> {
        ["demand_next", "price_next", "name", "description"]
            .map(String::from)
            .to_vec()
    }

    #[test]
    fn reads_and_sorts_rows() {
        let table = read_feature_table(TABLE.as_bytes(), &exclude()).expect("valid table");
        assert_eq!(table.len(), 2);
        let first = &table.rows()[0];
        assert_eq!(first.date(), NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"));
        assert_eq!(first.load(), 100.0);
        assert_eq!(first.temp_c(), 3.5);
        assert_eq!(first.value(&Column::Covariate("humidity".into())), Some(82.0));
    }

    #[test]
    fn excluded_and_derived_columns() {
        let table = read_feature_table(TABLE.as_bytes(), &exclude()).expect("valid table");
        assert_eq!(
            table.columns(),
            ["Actual Load", "Price", "temp_C", "demand_lag1", "humidity"]
        );
        // recomputed by the engine, not stored
        assert_eq!(table.rows()[0].value(&Column::Covariate("demand_lag1".into())), None);
        assert_eq!(table.schema().len(), 5);
    }

    #[test]
    fn non_numeric_column_is_dropped_without_exclusion() {
        let table = read_feature_table(TABLE.as_bytes(), &[]).expect("valid table");
        assert!(!table.columns().iter().any(|c| c == "name"));
        assert!(table.columns().iter().any(|c| c == "demand_next"));
    }

    #[test]
    fn missing_required_column() {
        let csv = "datetime,Actual Load,temp_C\n2024-01-01,1,2\n";
        assert!(matches!(
            read_feature_table(csv.as_bytes(), &[]),
            Err(DataError::MissingColumn(c)) if c == "Price"
        ));
    }

    #[test]
    fn bad_required_value_reports_position() {
        let csv = "datetime,Actual Load,Price,temp_C\n2024-01-01,1,n/a,2\n";
        assert!(matches!(
            read_feature_table(csv.as_bytes(), &[]),
            Err(DataError::InvalidValue { row: 0, column, .. }) if column == "Price"
        ));
    }

    #[test]
    fn bad_date_is_invalid_value() {
        let csv = "datetime,Actual Load,Price,temp_C\nyesterday,1,1,2\n";
        assert!(matches!(
            read_feature_table(csv.as_bytes(), &[]),
            Err(DataError::InvalidValue { .. })
        ));
    }
}

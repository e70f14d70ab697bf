//! CSV export for forecast tables.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::DataError;
use crate::forecast::ForecastRecord;

/// Column header of forecast tables.
const HEADER: [&str; 3] = ["datetime", "predicted_demand", "predicted_price"];

/// Conventional location of a city's forecast inside `dir`.
pub fn forecast_path(dir: &Path, city: &str) -> PathBuf {
    dir.join(format!("forecast_{city}.csv"))
}

/// Exports a forecast to `path`, creating parent directories as needed.
///
/// # Errors
///
/// `Io` if the directory or file cannot be created, `Csv` if writing fails.
pub fn export_forecast(records: &[ForecastRecord], path: &Path) -> Result<(), DataError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DataError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| DataError::io(path, e))?;
    write_forecast_csv(records, io::BufWriter::new(file))?;
    Ok(())
}

/// Writes forecast records as CSV to any writer.
///
/// One row per day in input order, values with four decimals. Identical
/// input gives byte-identical output.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_forecast_csv(records: &[ForecastRecord], writer: impl Write) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER)?;
    for r in records {
        wtr.write_record(&[
            r.date.format("%Y-%m-%d").to_string(),
            format!("{:.4}", r.predicted_demand),
            format!("{:.4}", r.predicted_price),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

mod csv_io;
mod json_io;

use std::path::Path;

use crate::error::ConvergenceError;
use crate::models::Dataset;

pub use csv_io::{read_csv, read_csv_from_bytes, write_csv};
pub use json_io::{read_json, read_json_from_bytes, to_json_string, write_json};

/// Each entity's series may hold at most one observation per year.
fn check_unique_years(dataset: &Dataset) -> Result<(), ConvergenceError> {
    match dataset.first_duplicate_year() {
        Some((entity, indicator, year)) => Err(ConvergenceError::ValidationError(format!(
            "entity '{entity}' has more than one {indicator} observation for {year}"
        ))),
        None => Ok(()),
    }
}

/// Trait for loading a dataset of indicator histories from a file.
pub trait DatasetReader {
    fn read(&self, path: &Path) -> Result<Dataset, ConvergenceError>;
}

/// Long-format CSV reader.
pub struct CsvFormat;

impl DatasetReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<Dataset, ConvergenceError> {
        read_csv(path)
    }
}

/// JSON reader.
pub struct JsonFormat;

impl DatasetReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<Dataset, ConvergenceError> {
        read_json(path)
    }
}

/// Reader matching the file extension of `path`.
pub fn reader_for(path: &Path) -> Result<Box<dyn DatasetReader>, ConvergenceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat)),
        _ => Err(ConvergenceError::ParseError(format!(
            "Unsupported file format: .{ext}. Use .csv or .json"
        ))),
    }
}

/// Load a dataset, choosing the format from the file extension.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset, ConvergenceError> {
    let path = path.as_ref();
    reader_for(path)?.read(path)
}

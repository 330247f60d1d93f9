use std::path::Path;

use serde::Serialize;

use super::check_unique_years;
use crate::error::ConvergenceError;
use crate::models::Dataset;

/// Read a dataset from a JSON file.
pub fn read_json(path: impl AsRef<Path>) -> Result<Dataset, ConvergenceError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    read_json_from_bytes(content.as_bytes())
}

/// Read a dataset from JSON bytes. Entity ids default to their map keys.
pub fn read_json_from_bytes(data: &[u8]) -> Result<Dataset, ConvergenceError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| ConvergenceError::ParseError(format!("Invalid UTF-8: {e}")))?;
    let mut dataset: Dataset = serde_json::from_str(content)?;
    for (key, entity) in dataset.entities.iter_mut() {
        if entity.id.is_empty() {
            entity.id = key.clone();
        } else if entity.id != *key {
            return Err(ConvergenceError::ValidationError(format!(
                "entity keyed '{key}' declares id '{}'",
                entity.id
            )));
        }
    }
    check_unique_years(&dataset)?;
    Ok(dataset)
}

/// Write any serializable report or dataset as JSON.
pub fn write_json<T: Serialize>(
    value: &T,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), ConvergenceError> {
    std::fs::write(path.as_ref(), to_json_string(value, pretty)?)?;
    Ok(())
}

pub fn to_json_string<T: Serialize>(value: &T, pretty: bool) -> Result<String, ConvergenceError> {
    let content = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(content)
}

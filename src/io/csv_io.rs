use std::io::Read;
use std::path::Path;

use super::check_unique_years;
use crate::error::ConvergenceError;
use crate::models::{Dataset, SeriesPoint};

/// Long-format CSV row: one observation per line.
#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct ObservationRow {
    entity: String,
    indicator: String,
    year: i32,
    value: Option<f64>,
    #[serde(default)]
    entity_name: Option<String>,
}

fn parse_csv_records<R: Read>(
    rdr: &mut csv::Reader<R>,
    dataset: &mut Dataset,
) -> Result<(), ConvergenceError> {
    for result in rdr.deserialize() {
        let row: ObservationRow = result?;
        if row.entity.is_empty() || row.indicator.is_empty() {
            return Err(ConvergenceError::ParseError(format!(
                "observation for year {} lacks an entity or indicator",
                row.year
            )));
        }
        // blank cells are gaps in the series, not zeros
        let Some(value) = row.value else {
            continue;
        };
        dataset.push_point(&row.entity, &row.indicator, SeriesPoint::new(row.year, value));
        if let Some(name) = row.entity_name.filter(|n| !n.is_empty()) {
            if let Some(entity) = dataset.entities.get_mut(&row.entity) {
                entity.name = name;
            }
        }
    }
    Ok(())
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true).trim(csv::Trim::All);
    builder
}

/// Read a dataset from a long-format CSV file
/// (`entity,indicator,year,value[,entity_name]`).
pub fn read_csv(path: impl AsRef<Path>) -> Result<Dataset, ConvergenceError> {
    let path = path.as_ref();
    let mut rdr = reader_builder().from_path(path)?;

    let mut dataset = Dataset::new(
        path.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string()),
    );
    parse_csv_records(&mut rdr, &mut dataset)?;
    check_unique_years(&dataset)?;
    Ok(dataset)
}

/// Read a dataset from long-format CSV bytes.
pub fn read_csv_from_bytes(data: &[u8], name: &str) -> Result<Dataset, ConvergenceError> {
    let mut rdr = reader_builder().from_reader(data);
    let mut dataset = Dataset::new(name);
    parse_csv_records(&mut rdr, &mut dataset)?;
    check_unique_years(&dataset)?;
    Ok(dataset)
}

/// Write a dataset as long-format CSV.
pub fn write_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), ConvergenceError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;

    for entity in dataset.entities.values() {
        for (indicator, series) in &entity.indicators {
            for point in series {
                wtr.serialize(ObservationRow {
                    entity: entity.id.clone(),
                    indicator: indicator.clone(),
                    year: point.year,
                    value: Some(point.value),
                    entity_name: (!entity.name.is_empty()).then(|| entity.name.clone()),
                })?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

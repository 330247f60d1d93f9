use serde::{Deserialize, Serialize};

/// A single observation of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Year/value observations for one entity and one indicator.
///
/// Input series are not guaranteed to be sorted; consumers sort a copy
/// (see [`crate::analysis::series_ops::sorted`]) and never reorder the
/// caller's data in place.
pub type TimeSeries = Vec<SeriesPoint>;

/// Build a series from `(year, value)` pairs.
pub fn series_from_pairs(pairs: &[(i32, f64)]) -> TimeSeries {
    pairs
        .iter()
        .map(|&(year, value)| SeriesPoint::new(year, value))
        .collect()
}

use serde::{Deserialize, Serialize};

/// Outcome of a time-to-convergence calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "years", rename_all = "snake_case")]
pub enum Convergence {
    /// Converges after this many (fractional) years; `0.0` when already level or ahead.
    Converges(f64),
    /// The chaser grows no faster than the target and never catches up.
    Never,
    /// Inputs were missing, non-positive or non-finite.
    Unknown,
}

impl Convergence {
    /// Years to convergence, if it happens.
    pub fn years(&self) -> Option<f64> {
        match self {
            Convergence::Converges(years) => Some(*years),
            _ => None,
        }
    }

    pub fn converges(&self) -> bool {
        matches!(self, Convergence::Converges(_))
    }

    /// Calendar year of convergence: `round(base_year + years)`.
    pub fn convergence_year(&self, base_year: i32) -> Option<i32> {
        self.years()
            .map(|years| (base_year as f64 + years).round())
            .filter(|year| year.is_finite() && year.abs() < i32::MAX as f64)
            .map(|year| year as i32)
    }
}

impl std::fmt::Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convergence::Converges(years) => write!(f, "{years:.1} years"),
            Convergence::Never => write!(f, "never"),
            Convergence::Unknown => write!(f, "unknown"),
        }
    }
}

/// One year of a chaser/target projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year: i32,
    pub chaser_value: f64,
    pub target_value: f64,
}

impl ProjectionPoint {
    /// Chaser value as a share of the target value.
    pub fn ratio(&self) -> Option<f64> {
        let ratio = self.chaser_value / self.target_value;
        let valid = self.chaser_value.is_finite()
            && self.chaser_value > 0.0
            && self.target_value.is_finite()
            && self.target_value > 0.0;
        valid.then_some(ratio)
    }
}

/// First projection year at which the chaser reaches `percentage` of the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub percentage: f64,
    pub year: i32,
    pub chaser_value: f64,
    pub target_value: f64,
}

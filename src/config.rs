use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::{DEFAULT_DELTA, DEFAULT_MILESTONES};
use crate::error::ConvergenceError;
use crate::models::{DonorPool, MetricDefinition, Scenario, BASELINE_SCENARIO};

/// Indicator code of income per capita (constant USD).
pub const INCOME_INDICATOR: &str = "NY.GDP.PCAP.KD";
/// Indicator code of total population.
pub const POPULATION_INDICATOR: &str = "SP.POP.TOTL";

/// Longest projection horizon a config may ask for.
pub const MAX_HORIZON_YEARS: u32 = 1_000;
/// Longest growth-rate lookback window a config may ask for.
pub const MAX_LOOKBACK_YEARS: u32 = 200;

/// Engine defaults and static tables, loadable from TOML.
///
/// Every key is optional; omitted keys take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of yearly points in a projection
    pub horizon_cap_years: u32,
    /// Chaser/target ratios reported as milestones
    pub milestone_percentages: Vec<f64>,
    /// Growth-rate perturbation for sensitivity bands
    pub sensitivity_delta: f64,
    /// Lookback window for growth-rate estimates
    pub cagr_lookback_years: u32,
    pub income_indicator: String,
    pub population_indicator: String,
    pub metrics: Vec<MetricDefinition>,
    pub scenarios: Vec<Scenario>,
    pub donor_pools: Vec<DonorPool>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon_cap_years: 100,
            milestone_percentages: DEFAULT_MILESTONES.to_vec(),
            sensitivity_delta: DEFAULT_DELTA,
            cagr_lookback_years: 10,
            income_indicator: INCOME_INDICATOR.to_string(),
            population_indicator: POPULATION_INDICATOR.to_string(),
            metrics: MetricDefinition::builtin(),
            scenarios: Scenario::builtin(),
            donor_pools: DonorPool::builtin(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConvergenceError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConvergenceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            metrics = config.metrics.len(),
            scenarios = config.scenarios.len(),
            "loaded engine config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConvergenceError> {
        let invalid = |msg: String| Err(ConvergenceError::ValidationError(msg));

        if !(1..=MAX_HORIZON_YEARS).contains(&self.horizon_cap_years) {
            return invalid(format!(
                "horizon_cap_years must be between 1 and {MAX_HORIZON_YEARS}, got {}",
                self.horizon_cap_years
            ));
        }
        if let Some(p) = self
            .milestone_percentages
            .iter()
            .find(|p| !(p.is_finite() && **p > 0.0 && **p <= 1.0))
        {
            return invalid(format!("milestone percentage {p} outside (0, 1]"));
        }
        if !(self.sensitivity_delta.is_finite() && self.sensitivity_delta >= 0.0) {
            return invalid(format!(
                "sensitivity_delta must be non-negative, got {}",
                self.sensitivity_delta
            ));
        }
        if !(1..=MAX_LOOKBACK_YEARS).contains(&self.cagr_lookback_years) {
            return invalid(format!(
                "cagr_lookback_years must be between 1 and {MAX_LOOKBACK_YEARS}, got {}",
                self.cagr_lookback_years
            ));
        }

        let mut codes = HashSet::new();
        for metric in &self.metrics {
            if !codes.insert(metric.code.as_str()) {
                return invalid(format!("duplicate metric code '{}'", metric.code));
            }
            if let Some([min, max]) = metric.clamp_range {
                if !(min <= max) {
                    return invalid(format!(
                        "clamp range of '{}' has min {min} above max {max}",
                        metric.code
                    ));
                }
            }
        }

        let mut ids = HashSet::new();
        for scenario in &self.scenarios {
            if !ids.insert(scenario.id.as_str()) {
                return invalid(format!("duplicate scenario id '{}'", scenario.id));
            }
        }
        if !ids.contains(BASELINE_SCENARIO) {
            return invalid(format!("scenario table lacks '{BASELINE_SCENARIO}'"));
        }

        Ok(())
    }

    pub fn metric(&self, code: &str) -> Option<&MetricDefinition> {
        self.metrics.iter().find(|m| m.code == code)
    }

    pub fn donor_pool(&self, id: &str) -> Option<&DonorPool> {
        self.donor_pools.iter().find(|p| p.id == id)
    }
}

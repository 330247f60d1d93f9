use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{Adjustment, Scenario, BASELINE_SCENARIO};

/// Lookup table of named scenario adjustments.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    scenarios: BTreeMap<String, Scenario>,
    baseline: Scenario,
}

impl Default for ScenarioEngine {
    fn default() -> Self {
        Self::new(Scenario::builtin())
    }
}

impl ScenarioEngine {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        let scenarios: BTreeMap<String, Scenario> =
            scenarios.into_iter().map(|s| (s.id.clone(), s)).collect();
        let baseline = scenarios
            .get(BASELINE_SCENARIO)
            .cloned()
            .unwrap_or_else(Scenario::baseline);
        Self {
            scenarios,
            baseline,
        }
    }

    /// The scenario with `id`, or the baseline when the id is unknown.
    pub fn resolve(&self, id: &str) -> &Scenario {
        self.scenarios.get(id).unwrap_or_else(|| {
            warn!(scenario = id, "unknown scenario; using baseline");
            &self.baseline
        })
    }

    pub fn scenarios(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.values()
    }

    /// Adjust `implied_value` for `metric_code` under scenario `scenario_id`.
    pub fn apply(&self, scenario_id: &str, metric_code: &str, implied_value: Option<f64>) -> Option<f64> {
        let value = implied_value.filter(|v| v.is_finite())?;
        match self.resolve(scenario_id).adjustments.get(metric_code) {
            Some(adjustment) => Some(apply_adjustment(adjustment, value)),
            None => Some(value),
        }
    }
}

/// Multiplier first, then additive percentage points clamped to `[0, 100]`.
pub fn apply_adjustment(adjustment: &Adjustment, value: f64) -> f64 {
    let mut out = value;
    if let Some(multiplier) = adjustment.multiplier {
        out *= multiplier;
    }
    if let Some(points) = adjustment.additive_points {
        out = (out + points).max(0.0).min(100.0);
    }
    out
}

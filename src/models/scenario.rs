use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metric::{
    CAPITAL_FORMATION_PCT_GDP, CO2_EMISSIONS_PC, ELECTRICITY_USE_PC, ENERGY_USE_PC,
    MANUFACTURING_PCT_GDP, URBAN_POPULATION_PCT,
};

/// Id of the no-op scenario that unknown ids fall back to.
pub const BASELINE_SCENARIO: &str = "baseline";

/// Adjustment rule for one metric under a scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    #[serde(default)]
    pub multiplier: Option<f64>,
    /// Percentage points added to a share-of-total metric
    #[serde(default)]
    pub additive_points: Option<f64>,
}

impl Adjustment {
    pub fn multiply(factor: f64) -> Self {
        Self {
            multiplier: Some(factor),
            additive_points: None,
        }
    }

    pub fn add_points(points: f64) -> Self {
        Self {
            multiplier: None,
            additive_points: Some(points),
        }
    }
}

/// Defaults a scenario suggests to the caller. The engine never applies these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPresets {
    #[serde(default)]
    pub horizon_years: Option<u32>,
    #[serde(default)]
    pub chaser_growth_rate: Option<f64>,
}

/// A named set of per-metric adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub adjustments: BTreeMap<String, Adjustment>,
    #[serde(default)]
    pub presets: ScenarioPresets,
}

impl Scenario {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            adjustments: BTreeMap::new(),
            presets: ScenarioPresets::default(),
        }
    }

    pub fn baseline() -> Self {
        Scenario::new(BASELINE_SCENARIO, "Baseline (template path as observed)")
    }

    pub fn with(mut self, metric_code: &str, adjustment: Adjustment) -> Self {
        self.adjustments.insert(metric_code.to_string(), adjustment);
        self
    }

    pub fn with_presets(mut self, presets: ScenarioPresets) -> Self {
        self.presets = presets;
        self
    }

    /// The built-in scenario table.
    pub fn builtin() -> Vec<Scenario> {
        vec![
            Scenario::baseline(),
            Scenario::new("efficiency", "Energy efficiency push")
                .with(ENERGY_USE_PC, Adjustment::multiply(0.85))
                .with(ELECTRICITY_USE_PC, Adjustment::multiply(0.9))
                .with(CO2_EMISSIONS_PC, Adjustment::multiply(0.8)),
            Scenario::new("rapid_urbanization", "Rapid urbanization")
                .with(URBAN_POPULATION_PCT, Adjustment::add_points(5.0))
                .with(ELECTRICITY_USE_PC, Adjustment::multiply(1.05)),
            Scenario::new("green_growth", "Green growth")
                .with(CO2_EMISSIONS_PC, Adjustment::multiply(0.6))
                .with(ELECTRICITY_USE_PC, Adjustment::multiply(1.1))
                .with_presets(ScenarioPresets {
                    horizon_years: Some(50),
                    chaser_growth_rate: None,
                }),
            Scenario::new("industrial_push", "Export-led industrialisation")
                .with(MANUFACTURING_PCT_GDP, Adjustment::add_points(3.0))
                .with(CAPITAL_FORMATION_PCT_GDP, Adjustment::add_points(4.0))
                .with(ENERGY_USE_PC, Adjustment::multiply(1.1))
                .with_presets(ScenarioPresets {
                    horizon_years: None,
                    chaser_growth_rate: Some(0.06),
                }),
        ]
    }
}

mod series;
mod metric;
mod scenario;
mod projection;
mod dataset;

pub use series::{series_from_pairs, SeriesPoint, TimeSeries};
pub use metric::{
    Composition, MetricDefinition, TotalsRule, Transform, CAPITAL_FORMATION_PCT_GDP,
    CO2_EMISSIONS_PC, ELECTRICITY_ACCESS_PCT, ELECTRICITY_USE_PC, ENERGY_USE_PC,
    MANUFACTURING_PCT_GDP, URBAN_POPULATION_PCT,
};
pub use scenario::{Adjustment, Scenario, ScenarioPresets, BASELINE_SCENARIO};
pub use projection::{Convergence, Milestone, ProjectionPoint};
pub use dataset::{Dataset, DonorPool, Entity};

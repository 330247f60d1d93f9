pub mod series_ops;
mod convergence;
mod template;
mod implication;
mod scenario;
mod totals;
mod sensitivity;
mod analyzer;

pub use series_ops::{cagr, project_value};
pub use convergence::{
    calculate_milestones, generate_projection, required_growth_rate, years_to_convergence,
    Projection, ProjectionIter, DEFAULT_MILESTONES,
};
pub use template::{build_mapping, predict, Interpolant, TemplatePoint};
pub use implication::{estimate, sanitize_anchor, Implication, ImplicationEstimator};
pub use scenario::{apply_adjustment, ScenarioEngine};
pub use totals::{compute_totals, compute_totals_with, convert, Totals, TotalsInput};
pub use sensitivity::{analyze, SensitivityCase, SensitivityReport, DEFAULT_DELTA};
pub use analyzer::{
    Comparison, ConvergenceSummary, GrowthAssumptions, ImplicationReport, ImplicationRow,
};

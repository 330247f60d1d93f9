pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod visualization;

pub use analysis::Comparison;
pub use config::EngineConfig;
pub use error::ConvergenceError;
pub use io::DatasetReader;
pub use models::{Convergence, Dataset, MetricDefinition, Scenario, SeriesPoint, TimeSeries};

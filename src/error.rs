use thiserror::Error;

/// Errors raised by the outer surfaces of the analyzer (I/O, configuration,
/// dataset lookups). The numeric engine itself reports missing results as
/// `None` or [`crate::models::Convergence`] variants instead.
#[derive(Error, Debug)]
pub enum ConvergenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

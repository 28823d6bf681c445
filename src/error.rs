//! Error types for the forecast_sales crate

use thiserror::Error;

/// Custom error types for the forecast_sales crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The transaction table has not been loaded
    #[error("Data not loaded")]
    DataNotLoaded,

    /// A forecast or evaluation was requested before training
    #[error("Model not trained")]
    ModelNotTrained,

    /// A filter matched no transactions
    #[error("No data in range: {0}")]
    EmptyFilter(String),

    /// A metric is undefined for the given inputs
    #[error("Degenerate metric: {0}")]
    DegenerateMetric(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV serialization
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

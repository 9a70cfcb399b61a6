//! Error types for the price_forecast crate

use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the price_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// A column still holds missing or non-numeric values after coercion
    #[error("The '{column}' column contains {count} missing or non-numeric values")]
    MissingValues { column: String, count: usize },

    /// The same date occurs twice in a date-keyed input
    #[error("Duplicate date {0} in input")]
    DuplicateDate(NaiveDate),

    /// Not enough history to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The market data source returned nothing for a selection
    #[error("No data available for {symbol}")]
    NoData { symbol: String },

    /// Error talking to a market data provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Error related to forecasting operations
    #[error("Forecasting error: {0}")]
    ForecastingError(String),

    /// Error related to parameter validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Ticker is not part of the configured list
    #[error("Unsupported ticker: {0}")]
    UnsupportedTicker(String),

    /// Error loading or validating configuration
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

impl ForecastError {
    /// Text shown to the user when a pipeline run ends without a forecast.
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::NoData { symbol } => format!(
                "Failed to fetch data for {}. Please try another stock.",
                symbol
            ),
            ForecastError::NetworkError(_) => {
                "Failed to fetch data for the selected stock. Please try another stock.".to_string()
            }
            ForecastError::MissingValues { column, .. } => format!(
                "The '{}' column contains missing values. Please try another stock.",
                column
            ),
            other => format!("Error: {}", other),
        }
    }

    /// Whether the failure means "no data for this selection" rather than a bug
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ForecastError::NoData { .. } | ForecastError::NetworkError(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::NetworkError(err.to_string())
    }
}

//! Error types for the forecast_trade crate

use chrono::NaiveDate;
use thiserror::Error;

/// Custom error types for the forecast_trade crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The market data provider has no bars for the symbol and period
    #[error("Not found: {0}")]
    NotFound(String),

    /// The symbol exists but its history is too short to train or predict
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// An indicator denominator is zero on the row used for prediction
    #[error("Numeric degeneracy: feature '{feature}' is undefined on {date}")]
    NumericDegeneracy { feature: String, date: NaiveDate },

    /// The regression fit could not produce a usable model
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error loading or validating configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A market data provider request failed
    #[error("Provider error: {0}")]
    Provider(String),

    /// The narrative collaborator failed
    #[error("Narrative error: {0}")]
    Narrative(String),

    /// Error from indicator calculations
    #[error("Math error: {0}")]
    Math(#[from] trade_math::MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error encoding or decoding JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ForecastError {
    /// Whether the caller can correct the condition (bad symbol, short history,
    /// bad parameters) as opposed to an internal or upstream failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::NotFound(_)
                | ForecastError::InsufficientData(_)
                | ForecastError::NumericDegeneracy { .. }
                | ForecastError::InvalidParameter(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::Config(err.to_string())
    }
}

//! # Trade Math
//!
//! Rolling-window indicator calculations for daily price and volume series.
//!
//! Every indicator takes an ordered slice and returns a vector of the same
//! length. Entries are `None` until the window is filled, and also wherever
//! the indicator is undefined (for example a zero denominator). Callers decide
//! what an undefined entry means for them; nothing here substitutes a value.

use thiserror::Error;

// Indicator modules
pub mod moving_averages;
pub mod oscillators;
pub mod volatility;
pub mod volume;

pub use moving_averages::sma;
pub use oscillators::{rsi, rsi_with_policy, RsiZeroLoss};
pub use volatility::{annualized_volatility, bollinger_width, pct_change, rolling_std};
pub use volume::{volume_change, volume_ma_ratio};

/// Errors that can occur in trading-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for trading math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub(crate) fn check_window(window: usize, min: usize) -> Result<()> {
    if window < min {
        return Err(MathError::InvalidInput(format!(
            "Window must be at least {}, got {}",
            min, window
        )));
    }
    Ok(())
}

//! # Stock Forecast
//!
//! Workspace facade over the forecasting crates:
//!
//! - [`trade_math`]: rolling-window indicators (moving averages, RSI,
//!   Bollinger width, volatility, volume ratios)
//! - [`forecast_trade`]: feature engineering, per-horizon regression forests
//!   and the forecasting pipeline
//!
//! ## Example
//!
//! ```
//! use stock_forecast_workspace::trade_math::rsi;
//!
//! let closes: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
//! let values = rsi(&closes, 14).unwrap();
//! assert_eq!(values[29], Some(50.0));
//! ```

pub use forecast_trade;
pub use trade_math;

pub use forecast_trade::{ForecastBundle, ForecastError, ForecastPipeline, PipelineConfig};

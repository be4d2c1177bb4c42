//! # Forecast Trade
//!
//! A Rust library for multi-horizon daily stock price forecasting.
//!
//! ## Features
//!
//! - Daily OHLCV series with validation and CSV loading
//! - Engineered features (lags, moving averages, returns, RSI, Bollinger
//!   width, volatility and volume ratios) built on `trade_math`
//! - One bagged regression-tree model per forecast horizon, trained on
//!   standardized features
//! - Dated price forecasts that roll over weekends, with a JSON wire format
//! - Pluggable market data providers (Yahoo Finance, CSV directory) and an
//!   optional narrative generator
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_trade::config::PipelineConfig;
//! use forecast_trade::pipeline::ForecastPipeline;
//! use forecast_trade::providers::CsvProvider;
//!
//! let pipeline = ForecastPipeline::new(CsvProvider::new("data"), PipelineConfig::default())?;
//! let bundle = pipeline.forecast("AAPL")?;
//!
//! for point in &bundle.prediction {
//!     println!("{}: {:.2}", point.date, point.predicted_close);
//! }
//! # Ok::<(), forecast_trade::ForecastError>(())
//! ```
//!
//! Forecasts are deterministic for a given series and configuration: every
//! tree in a forest is seeded from the configured seed.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod models;
pub mod narrative;
pub mod pipeline;
pub mod providers;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{NoiseMode, PipelineConfig};
pub use crate::data::{ClosePoint, DataLoader, PriceBar, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureSet, FeatureTable};
pub use crate::forecast::{ForecastBundle, ForecastPoint, ForecastSynthesizer};
pub use crate::models::{HorizonModelTrainer, TrainedHorizonModel};
pub use crate::narrative::{GeminiClient, NarrativeGenerator, NarrativeRequest};
pub use crate::pipeline::ForecastPipeline;
pub use crate::providers::{CsvProvider, MarketDataProvider, Period, YahooProvider};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

//! End-to-end forecasting: fetch, build features, train one model per
//! horizon, synthesize dated prices.

use crate::config::PipelineConfig;
use crate::data::{ClosePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use crate::features::{FeatureBuilder, FeatureSet, FeatureTable};
use crate::forecast::{ForecastBundle, ForecastSynthesizer};
use crate::models::HorizonModelTrainer;
use crate::narrative::{NarrativeGenerator, NarrativeRequest};
use crate::providers::MarketDataProvider;
use log::{debug, info, warn};
use std::time::Instant;

/// Forecasting pipeline over a market data provider
///
/// Every call fetches fresh data and trains fresh models; nothing is cached
/// between calls.
pub struct ForecastPipeline<P: MarketDataProvider> {
    provider: P,
    config: PipelineConfig,
    builder: FeatureBuilder,
    trainer: HorizonModelTrainer,
    synthesizer: ForecastSynthesizer,
}

impl<P: MarketDataProvider> ForecastPipeline<P> {
    /// Validate `config` and wire up the pipeline stages
    pub fn new(provider: P, config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            provider,
            builder: FeatureBuilder::new(config.feature_set, config.rsi_zero_loss),
            trainer: HorizonModelTrainer::new(config.forest.clone()),
            synthesizer: ForecastSynthesizer::from_config(&config),
            config,
        })
    }

    /// Configuration the pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The full series for `symbol` over the configured period
    pub fn price_history(&self, symbol: &str) -> Result<PriceSeries> {
        let series = self.provider.fetch(symbol, self.config.period)?;
        if series.is_empty() {
            return Err(ForecastError::NotFound(format!(
                "No data found for {}",
                symbol
            )));
        }
        Ok(series)
    }

    /// Fetch `symbol` and forecast its next closes
    pub fn forecast(&self, symbol: &str) -> Result<ForecastBundle> {
        let series = self.price_history(symbol)?;
        self.forecast_series(&series)
    }

    /// Forecast from an already fetched series
    pub fn forecast_series(&self, series: &PriceSeries) -> Result<ForecastBundle> {
        if series.is_empty() {
            return Err(ForecastError::NotFound(format!(
                "No data found for {}",
                series.symbol()
            )));
        }

        let started = Instant::now();
        info!(
            "Forecasting {} from {} bars over horizons {:?}",
            series.symbol(),
            series.len(),
            self.config.horizons
        );

        let table = self.build_features(series)?;
        let latest = table.prediction_row()?;
        debug!(
            "{} complete feature rows out of {} bars",
            table.len(),
            table.bar_count()
        );

        let closes = series.closes();
        let models = self
            .trainer
            .train_all(&table, &closes, &self.config.horizons)?;
        let bundle = self.synthesizer.synthesize(series, latest, &models)?;

        info!(
            "Forecast for {} finished in {:.2?}",
            series.symbol(),
            started.elapsed()
        );
        Ok(bundle)
    }

    /// Feature table for `series`. When the latest bar is undefined only
    /// through its volume (zero or missing volume, as for FX pairs and many
    /// indices), the price features are used instead.
    fn build_features(&self, series: &PriceSeries) -> Result<FeatureTable> {
        let table = self.builder.build(series)?;
        if self.builder.feature_set() == FeatureSet::Price || !table.latest_volume_degenerate() {
            return Ok(table);
        }

        warn!(
            "Volume features are undefined on the latest bar of {}, using price features",
            series.symbol()
        );
        FeatureBuilder::new(FeatureSet::Price, self.config.rsi_zero_loss).build(series)
    }

    /// The last `n` closes for `symbol`, rounded to cents
    pub fn recent_history(&self, symbol: &str, n: usize) -> Result<Vec<ClosePoint>> {
        Ok(self.price_history(symbol)?.recent_closes(n))
    }

    /// History and forecast on one axis
    pub fn combined(&self, symbol: &str) -> Result<ForecastBundle> {
        self.forecast(symbol)
    }

    /// Recent closes and forecast from a single fetch
    pub fn narrative_request(&self, symbol: &str) -> Result<NarrativeRequest> {
        let series = self.price_history(symbol)?;
        let bundle = self.forecast_series(&series)?;

        Ok(NarrativeRequest {
            symbol: series.symbol().to_string(),
            recent: series.recent_closes(self.config.history_len),
            prediction: bundle.prediction,
        })
    }

    /// Commentary on the forecast for `symbol`
    pub fn reasoning(&self, symbol: &str, generator: &dyn NarrativeGenerator) -> Result<String> {
        let request = self.narrative_request(symbol)?;
        generator.explain(&request)
    }
}

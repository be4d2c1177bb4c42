mod common;

use common::{series_from_closes, test_config, wavy_series, with_volumes, StaticProvider};
use forecast_trade::narrative::{NarrativeGenerator, NarrativeRequest};
use forecast_trade::{ForecastError, ForecastPipeline, PipelineConfig, Result};
use pretty_assertions::assert_eq;
use std::cell::RefCell;

fn pipeline_for(series: forecast_trade::PriceSeries) -> ForecastPipeline<StaticProvider> {
    ForecastPipeline::new(StaticProvider { series }, test_config()).unwrap()
}

/// Records the request and echoes a fixed text
#[derive(Default)]
struct Recorder {
    seen: RefCell<Option<NarrativeRequest>>,
}

impl NarrativeGenerator for Recorder {
    fn explain(&self, request: &NarrativeRequest) -> Result<String> {
        *self.seen.borrow_mut() = Some(request.clone());
        Ok(format!("{} looks steady", request.symbol))
    }
}

#[test]
fn test_empty_series_is_not_found() {
    let pipeline = pipeline_for(series_from_closes("EMPTY", &[]));

    let err = pipeline.forecast("EMPTY").unwrap_err();
    assert!(matches!(err, ForecastError::NotFound(_)));
    assert!(err.is_client_error());
    assert!(matches!(
        pipeline.recent_history("EMPTY", 7),
        Err(ForecastError::NotFound(_))
    ));
}

#[test]
fn test_unknown_symbol_is_not_found() {
    let pipeline = pipeline_for(wavy_series(100));
    assert!(matches!(
        pipeline.forecast("NOPE"),
        Err(ForecastError::NotFound(_))
    ));
}

#[test]
fn test_short_history_is_insufficient() {
    let pipeline = pipeline_for(wavy_series(10));

    let err = pipeline.forecast("WAVE").unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData(_)));
    assert!(err.is_client_error());

    // History is still served
    assert_eq!(pipeline.recent_history("WAVE", 7).unwrap().len(), 7);
}

#[test]
fn test_recent_history() {
    let closes = [10.004, 10.126, 9.999, 10.5];
    let pipeline = pipeline_for(series_from_closes("ABC", &closes));

    let recent = pipeline.recent_history("ABC", 3).unwrap();
    let values: Vec<f64> = recent.iter().map(|p| p.close).collect();
    assert_eq!(values, vec![10.13, 10.0, 10.5]);
    assert!(recent.windows(2).all(|w| w[0].date < w[1].date));

    // Asking for more than exists returns everything
    assert_eq!(pipeline.recent_history("ABC", 10).unwrap().len(), 4);
}

#[test]
fn test_price_history_is_full_series() {
    let series = wavy_series(90);
    let pipeline = pipeline_for(series.clone());
    assert_eq!(pipeline.price_history("WAVE").unwrap(), series);
    assert_eq!(pipeline.config(), &test_config());
}

#[test]
fn test_combined_matches_forecast() {
    let pipeline = pipeline_for(wavy_series(200));
    let bundle = pipeline.forecast("WAVE").unwrap();
    assert_eq!(pipeline.combined("WAVE").unwrap().combined, bundle.combined);
}

#[test]
fn test_reasoning_receives_recent_closes_and_prediction() {
    let series = wavy_series(200);
    let pipeline = pipeline_for(series.clone());
    let recorder = Recorder::default();

    let text = pipeline.reasoning("WAVE", &recorder).unwrap();
    assert_eq!(text, "WAVE looks steady");

    let request = recorder.seen.borrow().clone().unwrap();
    assert_eq!(request.recent, series.recent_closes(7));
    assert_eq!(request.prediction, pipeline.forecast("WAVE").unwrap().prediction);
    assert!(request.prompt().contains("Predicted Close"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = PipelineConfig {
        horizons: vec![3, 2],
        ..PipelineConfig::default()
    };
    let result = ForecastPipeline::new(
        StaticProvider {
            series: wavy_series(10),
        },
        config,
    );
    assert!(matches!(result, Err(ForecastError::Config(_))));
}

#[test]
fn test_zero_volume_before_latest_bar_still_forecasts() {
    let series = wavy_series(300);
    let n = series.len();
    let series = with_volumes(&series, |t, v| if t == n - 2 { 0.0 } else { v });
    let pipeline = pipeline_for(series);

    let bundle = pipeline.forecast("WAVE").unwrap();
    assert_eq!(bundle.prediction.len(), 7);
}

#[test]
fn test_volume_free_series_uses_price_features() {
    let series = with_volumes(&wavy_series(300), |_, _| 0.0);
    let pipeline = pipeline_for(series.clone());

    let bundle = pipeline.forecast("WAVE").unwrap();
    assert_eq!(bundle.prediction.len(), 7);
    assert!(bundle.prediction.iter().all(|p| p.predicted_close > 0.0));

    // Same forecast as asking for the price features directly
    let config = PipelineConfig {
        feature_set: forecast_trade::FeatureSet::Price,
        ..test_config()
    };
    let price_only = ForecastPipeline::new(StaticProvider { series }, config).unwrap();
    assert_eq!(price_only.forecast("WAVE").unwrap(), bundle);
}

mod common;

use approx::assert_relative_eq;
use common::{series_from_closes, small_forest, wavy_series};
use forecast_trade::features::FeatureBuilder;
use forecast_trade::models::{HorizonModelTrainer, TrainingSet};
use forecast_trade::ForecastError;
use rstest::rstest;

#[rstest]
#[case(1)]
#[case(3)]
#[case(7)]
fn test_training_rows_stop_before_target_leaves_series(#[case] horizon: usize) {
    let series = wavy_series(300);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let closes = series.closes();

    let expected = table
        .rows()
        .iter()
        .filter(|r| r.index + horizon < closes.len())
        .count();
    let set = TrainingSet::align(&table, &closes, horizon);
    assert_eq!(set.len(), expected);

    // Targets are forward returns over bar indices
    let first = &table.rows()[0];
    let expected_target = (closes[first.index + horizon] - first.close) / first.close;
    assert_relative_eq!(set.targets[0], expected_target);

    let model = HorizonModelTrainer::new(small_forest())
        .train(&table, &closes, horizon)
        .unwrap();
    assert_eq!(model.horizon(), horizon);
    assert_eq!(model.training_rows(), expected);
}

#[test]
fn test_feature_importances_are_normalized() {
    let series = wavy_series(250);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let model = HorizonModelTrainer::new(small_forest())
        .train(&table, &series.closes(), 5)
        .unwrap();

    let importances = model.feature_importances();
    assert_eq!(importances.len(), table.features().len());
    assert!(importances.iter().all(|&v| v >= 0.0));
    assert_relative_eq!(importances.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_training_is_reproducible() {
    let series = wavy_series(220);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let closes = series.closes();
    let latest = table.prediction_row().unwrap();
    let trainer = HorizonModelTrainer::new(small_forest());

    let a = trainer.train(&table, &closes, 4).unwrap();
    let b = trainer.train(&table, &closes, 4).unwrap();
    assert_eq!(
        a.predict_return(&latest.values).unwrap(),
        b.predict_return(&latest.values).unwrap()
    );
}

#[test]
fn test_train_all_keeps_horizon_order() {
    let series = wavy_series(200);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let models = HorizonModelTrainer::new(small_forest())
        .train_all(&table, &series.closes(), &[1, 2, 3, 4, 5, 6, 7])
        .unwrap();

    let horizons: Vec<usize> = models.iter().map(|m| m.horizon()).collect();
    assert_eq!(horizons, vec![1, 2, 3, 4, 5, 6, 7]);
    assert!(models.windows(2).all(|w| w[0].training_rows() > w[1].training_rows()));
}

#[test]
fn test_zero_horizon_is_rejected() {
    let series = wavy_series(120);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let result = HorizonModelTrainer::default().train(&table, &series.closes(), 0);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_no_training_pairs_is_insufficient() {
    // Rows exist only for the last three bars
    let series = wavy_series(52);
    let table = FeatureBuilder::default().build(&series).unwrap();
    assert_eq!(table.len(), 3);

    let result = HorizonModelTrainer::new(small_forest()).train(&table, &series.closes(), 7);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_constant_target_fails_to_fit() {
    // Period-two prices give a zero return at every even horizon
    let closes: Vec<f64> = (0..120)
        .map(|t| if t % 2 == 0 { 100.0 } else { 101.0 })
        .collect();
    let series = series_from_closes("ALT", &closes);
    let table = FeatureBuilder::default().build(&series).unwrap();
    let trainer = HorizonModelTrainer::new(small_forest());

    let result = trainer.train(&table, &series.closes(), 2);
    assert!(matches!(result, Err(ForecastError::ModelFit(_))));

    assert!(trainer.train(&table, &series.closes(), 1).is_ok());
}

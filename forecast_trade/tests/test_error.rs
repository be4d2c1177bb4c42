use chrono::NaiveDate;
use forecast_trade::ForecastError;
use rstest::rstest;

#[test]
fn test_error_messages() {
    let err = ForecastError::NotFound("No data found for XYZ".to_string());
    assert_eq!(err.to_string(), "Not found: No data found for XYZ");

    let err = ForecastError::NumericDegeneracy {
        feature: "rsi_14".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
    };
    assert_eq!(
        err.to_string(),
        "Numeric degeneracy: feature 'rsi_14' is undefined on 2024-03-08"
    );
}

#[rstest]
#[case(ForecastError::NotFound("x".into()), true)]
#[case(ForecastError::InsufficientData("x".into()), true)]
#[case(ForecastError::InvalidParameter("x".into()), true)]
#[case(ForecastError::ModelFit("x".into()), false)]
#[case(ForecastError::Provider("x".into()), false)]
#[case(ForecastError::Config("x".into()), false)]
fn test_client_errors(#[case] err: ForecastError, #[case] expected: bool) {
    assert_eq!(err.is_client_error(), expected);
}

#[test]
fn test_math_error_conversion() {
    let math = trade_math::sma(&[1.0, 2.0], 0).unwrap_err();
    let err: ForecastError = math.into();
    assert!(matches!(err, ForecastError::Math(_)));
}

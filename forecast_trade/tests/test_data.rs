mod common;

use chrono::NaiveDate;
use common::wavy_series;
use forecast_trade::data::DataLoader;
use forecast_trade::providers::{CsvProvider, MarketDataProvider, Period};
use forecast_trade::{ForecastError, ForecastPipeline};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

fn write_series_csv(dir: &Path, symbol: &str, n: usize) {
    let series = wavy_series(n);
    let mut text = String::from("date,open,high,low,close,volume\n");
    for bar in series.bars() {
        text.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        ));
    }
    fs::write(dir.join(format!("{}.csv", symbol)), text).unwrap();
}

#[test]
fn test_loader_sorts_rows_and_accepts_capitalized_headers() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    writeln!(file, "2024-01-04,12.0,12.5,11.5,12.2,3000").unwrap();
    writeln!(file, "2024-01-02,10.0,10.5,9.5,10.2,1000").unwrap();
    writeln!(file, "2024-01-03,11.0,11.5,10.5,11.2,2000").unwrap();

    let series = DataLoader::from_csv(file.path(), "ABC").unwrap();
    assert_eq!(series.symbol(), "ABC");
    assert_eq!(series.closes(), vec![10.2, 11.2, 12.2]);
    assert_eq!(
        series.bars()[0].date,
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    );
}

#[test]
fn test_loader_rejects_invalid_rows() {
    let csv = "date,open,high,low,close,volume\n\
               2024-01-02,10.0,9.0,9.5,10.2,1000\n";
    assert!(matches!(
        DataLoader::from_reader(csv.as_bytes(), "ABC"),
        Err(ForecastError::DataError(_))
    ));

    let csv = "date,open,high,low,close,volume\n\
               2024-01-02,10.0,10.5,9.5,not-a-price,1000\n";
    assert!(matches!(
        DataLoader::from_reader(csv.as_bytes(), "ABC"),
        Err(ForecastError::Csv(_))
    ));
}

#[test]
fn test_csv_provider_trims_to_period() {
    let dir = tempdir().unwrap();
    write_series_csv(dir.path(), "WAVE", 300);
    let provider = CsvProvider::new(dir.path());

    let all = provider.fetch("wave", Period::Max).unwrap();
    assert_eq!(all.len(), 300);
    assert_eq!(all.symbol(), "WAVE");

    let last = all.last().unwrap().date;
    let month = provider.fetch("WAVE", Period::OneMonth).unwrap();
    assert!(month.len() >= 19 && month.len() <= 23);
    assert_eq!(month.last().unwrap().date, last);
    assert!(month.bars()[0].date >= Period::OneMonth.start_for(last).unwrap());

    let ytd = provider.fetch("WAVE", Period::YearToDate).unwrap();
    assert!(ytd.bars().iter().all(|b| b.date.to_string().starts_with("2021")));
}

#[test]
fn test_csv_provider_missing_symbol_is_not_found() {
    let dir = tempdir().unwrap();
    let provider = CsvProvider::new(dir.path());

    let err = provider.fetch("MISSING", Period::OneYear).unwrap_err();
    assert!(matches!(err, ForecastError::NotFound(_)));

    fs::write(dir.path().join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
    assert!(matches!(
        provider.fetch("EMPTY", Period::Max),
        Err(ForecastError::NotFound(_))
    ));

    assert!(matches!(
        provider.fetch("../WAVE", Period::Max),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_pipeline_over_csv_directory() {
    let dir = tempdir().unwrap();
    write_series_csv(dir.path(), "WAVE", 260);

    let pipeline =
        ForecastPipeline::new(CsvProvider::new(dir.path()), common::test_config()).unwrap();
    let bundle = pipeline.forecast("WAVE").unwrap();
    assert_eq!(bundle.prediction.len(), 7);
}

//! Yahoo Finance chart API provider

use super::{MarketDataProvider, Period};
use crate::data::{PriceBar, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::DateTime;
use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/122.0.0.0 Safari/537.36";

#[derive(Deserialize, Debug)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize, Debug)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Daily bars from the Yahoo Finance chart endpoint
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a provider whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different chart endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn parse(symbol: &str, response: ChartResponse) -> Result<PriceSeries> {
        if let Some(error) = response.chart.error {
            return Err(ForecastError::NotFound(format!(
                "{}: {} ({})",
                symbol, error.description, error.code
            )));
        }

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ForecastError::NotFound(format!("No chart data for {}", symbol)))?;
        let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars: Vec<PriceBar> = Vec::with_capacity(result.timestamp.len());
        for (i, &ts) in result.timestamp.iter().enumerate() {
            let field = |values: &[Option<f64>]| values.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
                field(&quote.volume),
            ) else {
                continue;
            };
            let Some(date) = DateTime::from_timestamp(ts + result.meta.gmtoffset, 0) else {
                continue;
            };

            let bar = PriceBar {
                date: date.date_naive(),
                open,
                high,
                low,
                close,
                volume,
            };
            if let Err(e) = bar.validate() {
                debug!("Skipping bar for {}: {}", symbol, e);
                continue;
            }

            // A repeated date is an intraday refresh of the same session
            match bars.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => bars.push(bar),
            }
        }

        if bars.is_empty() {
            return Err(ForecastError::NotFound(format!(
                "No data found for {}",
                symbol
            )));
        }
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        PriceSeries::new(symbol, bars)
    }
}

impl MarketDataProvider for YahooProvider {
    fn fetch(&self, symbol: &str, period: Period) -> Result<PriceSeries> {
        let url = format!("{}/{}", self.base_url, symbol);
        debug!("Requesting {} bars for {}", period, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("range", period.as_str()), ("interval", "1d")])
            .send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ForecastError::NotFound(format!(
                "No data found for {} over {}",
                symbol, period
            ))),
            status if !status.is_success() => {
                let body = response
                    .text()
                    .unwrap_or_else(|_| "Unknown API error".to_string());
                Err(ForecastError::Provider(format!("{}: {}", status, body)))
            }
            _ => Self::parse(symbol, response.json::<ChartResponse>()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_json(json: &str) -> Result<PriceSeries> {
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse("TEST", response)
    }

    #[test]
    fn test_parse_skips_null_rows() {
        // 2024-03-07 and 2024-03-08 at 14:30 UTC, exchange offset -5h
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1709821800,1709908200,1710167400],
            "indicators":{"quote":[{
                "open":[10.0,null,12.0],
                "high":[11.0,12.0,13.0],
                "low":[9.5,10.5,11.5],
                "close":[10.5,11.5,12.5],
                "volume":[1000,2000,3000]
            }]}
        }],"error":null}}"#;

        let series = parse_json(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].date.to_string(), "2024-03-07");
        assert_eq!(series.bars()[1].date.to_string(), "2024-03-11");
        assert_eq!(series.bars()[1].volume, 3000.0);
    }

    #[test]
    fn test_parse_skips_null_volume() {
        // A missing volume must not turn into a zero that later divides
        let json = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":-18000},
            "timestamp":[1709821800,1709908200,1710167400],
            "indicators":{"quote":[{
                "open":[10.0,11.0,12.0],
                "high":[11.0,12.0,13.0],
                "low":[9.5,10.5,11.5],
                "close":[10.5,11.5,12.5],
                "volume":[1000,null,3000]
            }]}
        }],"error":null}}"#;

        let series = parse_json(json).unwrap();
        let dates: Vec<String> = series.bars().iter().map(|b| b.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-07", "2024-03-11"]);
        assert!(series.volumes().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_parse_error_is_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse_json(json), Err(ForecastError::NotFound(_))));
    }

    #[test]
    fn test_parse_empty_is_not_found() {
        let json = r#"{"chart":{"result":[{"meta":{},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse_json(json), Err(ForecastError::NotFound(_))));
    }
}

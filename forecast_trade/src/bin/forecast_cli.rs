use clap::{Parser, Subcommand};
use forecast_trade::{
    CsvProvider, ForecastError, ForecastPipeline, GeminiClient, MarketDataProvider, Period,
    PipelineConfig, YahooProvider,
};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Multi-horizon daily stock price forecasts")]
struct Cli {
    /// Pipeline configuration (TOML)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Read `{SYMBOL}.csv` files from this directory instead of Yahoo Finance
    #[arg(long, value_name = "DIR", global = true)]
    csv_dir: Option<PathBuf>,

    /// Lookback period, overriding the configuration
    #[arg(long, global = true)]
    period: Option<Period>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Full daily history
    History { symbol: String },
    /// Recent closes and the forecast
    Predict { symbol: String },
    /// History and forecast as one series
    Combined { symbol: String },
    /// Commentary on the forecast (needs GEMINI_API_KEY)
    Reasoning { symbol: String },
}

#[derive(Serialize)]
struct Reasoning<'a> {
    symbol: &'a str,
    reasoning: String,
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> forecast_trade::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> forecast_trade::Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(period) = cli.period {
        config.period = period;
    }
    let timeout = Duration::from_secs(config.request_timeout_secs);

    let provider: Box<dyn MarketDataProvider> = match &cli.csv_dir {
        Some(dir) => Box::new(CsvProvider::new(dir)),
        None => Box::new(YahooProvider::new(timeout)?),
    };
    let pipeline = ForecastPipeline::new(provider, config)?;

    match cli.cmd {
        Cmd::History { symbol } => print_json(pipeline.price_history(&symbol)?.bars()),
        Cmd::Predict { symbol } => {
            let bundle = pipeline.forecast(&symbol)?;
            print_json(&serde_json::json!({
                "symbol": bundle.symbol,
                "historical": bundle.historical,
                "prediction": bundle.prediction,
            }))
        }
        Cmd::Combined { symbol } => print_json(&pipeline.combined(&symbol)?.combined),
        Cmd::Reasoning { symbol } => {
            let gemini = GeminiClient::from_env(timeout)?;
            let reasoning = pipeline.reasoning(&symbol, &gemini)?;
            print_json(&Reasoning {
                symbol: &symbol,
                reasoning,
            })
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ ForecastError::NotFound(_)) => {
            error!("{}", e);
            ExitCode::from(3)
        }
        Err(e) if e.is_client_error() => {
            error!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

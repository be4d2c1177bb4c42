//! Plain-language commentary on a forecast
//!
//! The pipeline only assembles a [`NarrativeRequest`]; turning it into text is
//! delegated to a [`NarrativeGenerator`]. [`GeminiClient`] is the hosted
//! implementation.

use crate::data::ClosePoint;
use crate::error::{ForecastError, Result};
use crate::forecast::ForecastPoint;
use log::debug;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt::Write;
use std::time::Duration;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Recent closes and the forecast for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeRequest {
    pub symbol: String,
    pub recent: Vec<ClosePoint>,
    pub prediction: Vec<ForecastPoint>,
}

impl NarrativeRequest {
    /// Prompt text describing the request
    pub fn prompt(&self) -> String {
        let mut prompt = format!(
            "Analyze the following recent stock data and {}-day prediction for {}.\n\n",
            self.prediction.len(),
            self.symbol
        );

        prompt.push_str("Recent Historical Data:\n");
        for point in &self.recent {
            let _ = writeln!(prompt, "Date: {}, Close: ${:.2}", point.date, point.close);
        }

        let _ = writeln!(
            prompt,
            "\nPrediction for Next {} Days:",
            self.prediction.len()
        );
        for point in &self.prediction {
            let _ = writeln!(
                prompt,
                "Date: {}, Predicted Close: ${:.2}",
                point.date, point.predicted_close
            );
        }

        prompt.push_str(
            "\nProvide a brief explanation of the stock's short-term trend, focusing on:\n\
             1. Key patterns in the historical data\n\
             2. The predicted direction and volatility\n\
             3. Notable price levels or potential turning points\n\
             4. Overall sentiment (bullish, bearish, or neutral)\n\n\
             Keep your analysis concise (100-150 words) and focus on actionable insights.\n",
        );
        prompt
    }
}

/// Produces commentary for a forecast
pub trait NarrativeGenerator {
    fn explain(&self, request: &NarrativeRequest) -> Result<String>;
}

impl<T: NarrativeGenerator + ?Sized> NarrativeGenerator for &T {
    fn explain(&self, request: &NarrativeRequest) -> Result<String> {
        (**self).explain(request)
    }
}

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiClient {
    client: Client,
    api_key: SecretString,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: GEMINI_URL.to_string(),
        })
    }

    /// Read the API key from `GEMINI_API_KEY`
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ForecastError::Config(format!("{} is not set", API_KEY_VAR)))?;
        Self::new(SecretString::new(key.into()), timeout)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn extract_text(body: &Value) -> Result<String> {
        body.pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                ForecastError::Narrative("Response contained no candidate text".to_string())
            })
    }
}

impl NarrativeGenerator for GeminiClient {
    fn explain(&self, request: &NarrativeRequest) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }]
        });
        debug!("Requesting narrative for {}", request.symbol);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(ForecastError::Narrative(format!("{}: {}", status, text)));
        }

        Self::extract_text(&response.json::<Value>()?)
    }
}

//! TradingView scanner client for current indicator values

use super::{IndicatorMap, IndicatorRequest};
use crate::config::TradingViewConfig;
use crate::error::{Result, ScraperError};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP client for `scanner.tradingview.com/symbol`
#[derive(Debug, Clone)]
pub struct ScannerClient {
    client: Client,
    base_url: String,
}

impl ScannerClient {
    /// Create a new scanner client
    pub fn new(config: &TradingViewConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.scanner_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the requested columns for one ticker
    pub async fn scrape(&self, request: &IndicatorRequest) -> Result<IndicatorMap> {
        validate_request(request)?;

        let suffix = request.timeframe.scanner_suffix();
        let fields = request
            .indicators
            .iter()
            .map(|name| match suffix {
                Some(suffix) => format!("{}|{}", name, suffix),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(",");

        let mut url = url::Url::parse(&format!("{}/symbol", self.base_url)).map_err(|e| {
            ScraperError::InvalidRequest {
                message: format!("invalid scanner url: {}", e),
            }
        })?;
        url.query_pairs_mut()
            .append_pair("symbol", &request.ticker())
            .append_pair("fields", &fields)
            .append_pair("no_404", "true");

        debug!(ticker = %request.ticker(), columns = request.indicators.len(), "Scanner request");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScraperError::Http { status, body }.into());
        }

        let body: serde_json::Value = response.json().await?;
        let values = match body {
            serde_json::Value::Object(map) => map,
            other => {
                return Err(ScraperError::UnexpectedResponse {
                    message: format!("expected a JSON object, got {}", json_kind(&other)),
                }
                .into())
            }
        };

        if values.is_empty() {
            return Err(ScraperError::SymbolNotFound {
                exchange: request.exchange.clone(),
                symbol: request.symbol.clone(),
            }
            .into());
        }

        Ok(strip_suffix(values, suffix))
    }
}

fn validate_request(request: &IndicatorRequest) -> Result<()> {
    if request.symbol.trim().is_empty() {
        return Err(ScraperError::InvalidRequest {
            message: "symbol must not be empty".to_string(),
        }
        .into());
    }
    if request.exchange.trim().is_empty() {
        return Err(ScraperError::InvalidRequest {
            message: "exchange must not be empty".to_string(),
        }
        .into());
    }
    if request.indicators.is_empty() {
        return Err(ScraperError::InvalidRequest {
            message: "at least one indicator is required".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Remove the `|<suffix>` the scanner echoes back on every key
fn strip_suffix(values: IndicatorMap, suffix: Option<&str>) -> IndicatorMap {
    let Some(suffix) = suffix else {
        return values;
    };
    let tail = format!("|{}", suffix);

    values
        .into_iter()
        .map(|(key, value)| match key.strip_suffix(&tail) {
            Some(stripped) => (stripped.to_string(), value),
            None => (key, value),
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

//! State shared by the market data tools

use super::ToolCall;
use crate::config::{ServerConfig, ToolDefaults};
use crate::error::Result;
use crate::market::SharedMarketData;
use std::path::PathBuf;

/// Data source, defaults and export location handed to every tool
pub struct ToolContext {
    pub market: SharedMarketData,
    pub defaults: ToolDefaults,
    pub export_dir: PathBuf,
}

/// Arguments common to every market data tool
#[derive(Debug, Clone, PartialEq)]
pub struct MarketArgs {
    pub symbol: String,
    pub exchange: String,
    /// Kept as given so envelopes echo the caller's value even when invalid
    pub timeframe: String,
    pub export_result: bool,
}

impl ToolContext {
    /// Build a context from a resolved configuration
    pub fn new(market: SharedMarketData, config: &ServerConfig) -> Self {
        Self {
            market,
            defaults: config.defaults.clone(),
            export_dir: config.export_dir.clone(),
        }
    }

    /// Read `symbol`, `exchange`, `timeframe` and `export_result`
    pub fn market_args(&self, call: &ToolCall) -> Result<MarketArgs> {
        Ok(MarketArgs {
            symbol: call.get_parameter("symbol")?,
            exchange: call.get_parameter_or("exchange", self.defaults.exchange.clone())?,
            timeframe: call.get_parameter_or("timeframe", self.defaults.timeframe.clone())?,
            export_result: call.get_parameter_or("export_result", false)?,
        })
    }

    /// Arguments for `symbol` with every other value defaulted
    pub fn default_args(&self, symbol: &str) -> MarketArgs {
        MarketArgs {
            symbol: symbol.to_string(),
            exchange: self.defaults.exchange.clone(),
            timeframe: self.defaults.timeframe.clone(),
            export_result: false,
        }
    }

    /// JSON schema properties shared by every market data tool
    pub fn common_properties(&self) -> serde_json::Map<String, serde_json::Value> {
        let timeframes: Vec<&str> = crate::market::Timeframe::ALL
            .iter()
            .map(|tf| tf.as_str())
            .collect();

        let properties = serde_json::json!({
            "symbol": {
                "type": "string",
                "description": "Trading symbol (e.g. \"BTCUSD\", \"AAPL\")"
            },
            "exchange": {
                "type": "string",
                "description": format!("Exchange name (default: \"{}\")", self.defaults.exchange),
                "default": self.defaults.exchange
            },
            "timeframe": {
                "type": "string",
                "enum": timeframes,
                "description": format!("Timeframe (default: \"{}\")", self.defaults.timeframe),
                "default": self.defaults.timeframe
            },
            "export_result": {
                "type": "boolean",
                "description": "Whether to export results to a JSON file (default: false)",
                "default": false
            }
        });

        properties.as_object().cloned().unwrap_or_default()
    }
}

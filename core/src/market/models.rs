//! Request and response shapes for the market data client

use super::Timeframe;
use serde::{Deserialize, Serialize};

/// Indicator name to value, in the order TradingView returned them
pub type IndicatorMap = serde_json::Map<String, serde_json::Value>;

/// A single scanner lookup
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRequest {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Scanner columns without timeframe suffix
    pub indicators: Vec<String>,
}

impl IndicatorRequest {
    /// `EXCHANGE:SYMBOL` ticker used by TradingView
    pub fn ticker(&self) -> String {
        ticker(&self.exchange, &self.symbol)
    }
}

/// A single candle streaming session
#[derive(Debug, Clone, PartialEq)]
pub struct CandleRequest {
    pub exchange: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Maximum number of candles to collect
    pub max_records: u32,
}

impl CandleRequest {
    /// `EXCHANGE:SYMBOL` ticker used by TradingView
    pub fn ticker(&self) -> String {
        ticker(&self.exchange, &self.symbol)
    }
}

/// One OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub index: u64,
    pub timestamp: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Result of a streaming session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub ohlc: Vec<Candle>,
}

fn ticker(exchange: &str, symbol: &str) -> String {
    format!(
        "{}:{}",
        exchange.trim().to_uppercase(),
        symbol.trim().to_uppercase()
    )
}

//! Response envelope returned by every market data tool
//!
//! Every envelope carries `success`, `symbol` and `exchange`. The remaining
//! fields depend on the tool and are omitted when unset, except
//! `export_file` on history results which is always present (possibly
//! `null`).

use crate::market::{Candle, IndicatorMap};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub symbol: String,
    pub exchange: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_indicators: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<IndicatorMap>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_collected: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Candle>>,

    /// Outer `None` omits the key, `Some(None)` serializes `null`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_file: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    fn base(success: bool, symbol: &str, exchange: &str) -> Self {
        Self {
            success,
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
            timeframe: None,
            requested_indicators: None,
            indicators: None,
            records_collected: None,
            data: None,
            export_file: None,
            error: None,
        }
    }

    /// Successful indicator lookup
    pub fn indicators(symbol: &str, exchange: &str, timeframe: &str, indicators: IndicatorMap) -> Self {
        Self {
            timeframe: Some(timeframe.to_string()),
            indicators: Some(indicators),
            ..Self::base(true, symbol, exchange)
        }
    }

    /// Successful candle collection
    pub fn history(
        symbol: &str,
        exchange: &str,
        timeframe: &str,
        candles: Vec<Candle>,
        export_file: Option<String>,
    ) -> Self {
        Self {
            timeframe: Some(timeframe.to_string()),
            records_collected: Some(candles.len()),
            data: Some(candles),
            export_file: Some(export_file),
            ..Self::base(true, symbol, exchange)
        }
    }

    /// Failed call; `timeframe` is omitted when `None`
    pub fn failure(symbol: &str, exchange: &str, timeframe: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            timeframe: timeframe.map(str::to_string),
            error: Some(error.into()),
            ..Self::base(false, symbol, exchange)
        }
    }

    /// Record which indicator names were asked for
    pub fn with_requested(mut self, requested: Vec<String>) -> Self {
        self.requested_indicators = Some(requested);
        self
    }

    /// Record the path of an exported file
    pub fn with_export_file(mut self, path: String) -> Self {
        self.export_file = Some(Some(path));
        self
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

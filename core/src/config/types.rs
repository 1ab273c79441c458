//! Resolved configuration types for tvmcp core
//!
//! Core only accepts fully resolved, validated configuration.
//! All discovery, loading, and merging happens in CLI layer.

use crate::error::{ConfigError, Result};
use crate::market::{Timeframe, MAX_CANDLES};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default server name reported during `initialize`
pub const DEFAULT_SERVER_NAME: &str = "TradingView Indicators Server";

/// Default values applied when a tool call omits an argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefaults {
    /// Exchange used when none is given
    pub exchange: String,
    /// Timeframe used when none is given
    pub timeframe: String,
    /// Candle bound used by `get_historical_data`
    pub max_records: u32,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            exchange: "BINANCE".to_string(),
            timeframe: "1h".to_string(),
            max_records: 100,
        }
    }
}

/// TradingView endpoints and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingViewConfig {
    /// Base URL of the scanner HTTP API
    pub scanner_url: String,
    /// Chart feed WebSocket URL
    pub websocket_url: String,
    /// Origin header sent with the WebSocket handshake
    pub origin: String,
    /// User agent for both transports
    pub user_agent: String,
    /// Timeout for a single scanner request
    pub request_timeout_secs: u64,
    /// Timeout for a whole candle streaming session
    pub stream_timeout_secs: u64,
}

impl Default for TradingViewConfig {
    fn default() -> Self {
        Self {
            scanner_url: "https://scanner.tradingview.com".to_string(),
            websocket_url: "wss://data.tradingview.com/socket.io/websocket?from=chart%2F&type=chart"
                .to_string(),
            origin: "https://www.tradingview.com".to_string(),
            user_agent: format!("tvmcp/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 10,
            stream_timeout_secs: 30,
        }
    }
}

/// A fully resolved server configuration ready for use by core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported to MCP hosts
    pub server_name: String,
    /// Tool argument defaults
    pub defaults: ToolDefaults,
    /// TradingView transport settings
    pub tradingview: TradingViewConfig,
    /// Directory receiving exported JSON files
    pub export_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            defaults: ToolDefaults::default(),
            tradingview: TradingViewConfig::default(),
            export_dir: PathBuf::from("export"),
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "server_name".to_string(),
            }
            .into());
        }

        if self.defaults.exchange.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "defaults.exchange".to_string(),
            }
            .into());
        }

        if self.defaults.timeframe.parse::<Timeframe>().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "defaults.timeframe".to_string(),
                value: self.defaults.timeframe.clone(),
            }
            .into());
        }

        if !(1..=MAX_CANDLES).contains(&self.defaults.max_records) {
            return Err(ConfigError::InvalidValue {
                field: "defaults.max_records".to_string(),
                value: format!(
                    "{} (must be between 1 and {})",
                    self.defaults.max_records, MAX_CANDLES
                ),
            }
            .into());
        }

        for (field, value) in [
            ("tradingview.scanner_url", &self.tradingview.scanner_url),
            ("tradingview.websocket_url", &self.tradingview.websocket_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }

        if self.tradingview.request_timeout_secs == 0 || self.tradingview.stream_timeout_secs == 0
        {
            return Err(ConfigError::InvalidValue {
                field: "tradingview timeouts".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

//! TradingView market data client
//!
//! Two calls back the tools: `scrape` reads current indicator values from the
//! scanner HTTP API and `stream` collects OHLCV candles from the chart feed.
//! Tools only see the [`MarketDataSource`] trait so they can be exercised
//! against a mock.

pub mod catalog;
pub mod export;
pub mod frame;
pub mod models;
pub mod scanner;
pub mod streamer;
pub mod timeframe;

pub use models::{Candle, CandleRequest, CandleSeries, IndicatorMap, IndicatorRequest};
pub use scanner::ScannerClient;
pub use streamer::{ChartStreamer, MAX_CANDLES};
pub use timeframe::Timeframe;

use crate::config::TradingViewConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Source of indicator values and candles
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Current values for the requested indicator columns
    async fn scrape(&self, request: &IndicatorRequest) -> Result<IndicatorMap>;

    /// Up to `max_records` most recent candles
    async fn stream(&self, request: &CandleRequest) -> Result<CandleSeries>;
}

/// Shared handle passed to every tool
pub type SharedMarketData = Arc<dyn MarketDataSource>;

/// Live TradingView client
#[derive(Debug, Clone)]
pub struct TradingViewClient {
    scanner: ScannerClient,
    streamer: ChartStreamer,
}

impl TradingViewClient {
    /// Create a new client from resolved settings
    pub fn new(config: &TradingViewConfig) -> Result<Self> {
        Ok(Self {
            scanner: ScannerClient::new(config)?,
            streamer: ChartStreamer::new(config),
        })
    }
}

#[async_trait]
impl MarketDataSource for TradingViewClient {
    async fn scrape(&self, request: &IndicatorRequest) -> Result<IndicatorMap> {
        self.scanner.scrape(request).await
    }

    async fn stream(&self, request: &CandleRequest) -> Result<CandleSeries> {
        self.streamer.stream(request).await
    }
}

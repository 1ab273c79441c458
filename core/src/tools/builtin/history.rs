//! OHLCV history tool

use crate::error::{Result, ScraperError};
use crate::impl_tool_factory;
use crate::market::{export, CandleRequest, Timeframe, MAX_CANDLES};
use crate::tools::{Envelope, MarketArgs, Tool, ToolCall, ToolContext, ToolExample, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

pub const GET_HISTORICAL_DATA: &str = "get_historical_data";

/// Collect up to `max_records` candles and wrap them in an envelope.
///
/// Never fails: any error becomes a `success: false` envelope, which for
/// this tool carries no timeframe.
pub async fn get_historical_data(context: &ToolContext, args: &MarketArgs, max_records: i64) -> Envelope {
    info!(
        symbol = %args.symbol,
        exchange = %args.exchange,
        timeframe = %args.timeframe,
        max_records,
        "Starting OHLCV data collection"
    );

    match collect(context, args, max_records).await {
        Ok(envelope) => {
            info!(
                symbol = %args.symbol,
                timeframe = %args.timeframe,
                records = envelope.records_collected.unwrap_or(0),
                "Collected candles"
            );
            envelope
        }
        Err(e) => {
            error!(symbol = %args.symbol, error = %e, "Error collecting OHLCV data");
            Envelope::failure(&args.symbol, &args.exchange, None, e.to_string())
        }
    }
}

async fn collect(context: &ToolContext, args: &MarketArgs, max_records: i64) -> Result<Envelope> {
    let timeframe: Timeframe = args.timeframe.parse()?;

    let max_records = u32::try_from(max_records)
        .ok()
        .filter(|n| (1..=MAX_CANDLES).contains(n))
        .ok_or_else(|| ScraperError::InvalidRequest {
            message: format!(
                "max_records must be between 1 and {}, got {}",
                MAX_CANDLES, max_records
            ),
        })?;

    let request = CandleRequest {
        exchange: args.exchange.clone(),
        symbol: args.symbol.clone(),
        timeframe,
        max_records,
    };
    let series = context.market.stream(&request).await?;
    let candles = series.ohlc;

    let export_file = if args.export_result {
        let path = export::write_json(&context.export_dir, "ohlc", &args.symbol, &candles).await?;
        Some(path.display().to_string())
    } else {
        None
    };

    Ok(Envelope::history(
        &args.symbol,
        &args.exchange,
        &args.timeframe,
        candles,
        export_file,
    ))
}

/// Tool returning recent OHLCV candles for a symbol
pub struct GetHistoricalDataTool {
    context: Arc<ToolContext>,
}

impl GetHistoricalDataTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for GetHistoricalDataTool {
    fn name(&self) -> &str {
        GET_HISTORICAL_DATA
    }

    fn description(&self) -> &str {
        "Retrieve OHLCV (Open, High, Low, Close, Volume) candles for a given symbol.\n\
         \n\
         Opens a TradingView chart session and collects up to max_records of the most \
         recent candles for the timeframe. Options: 1m, 5m, 15m, 30m, 1h, 2h, 4h, 1d, 1w, 1M."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = self.context.common_properties();
        properties.insert(
            "max_records".to_string(),
            json!({
                "type": "integer",
                "minimum": 1,
                "maximum": MAX_CANDLES,
                "description": format!(
                    "Maximum number of OHLC records to collect (default: {})",
                    self.context.defaults.max_records
                ),
                "default": self.context.defaults.max_records
            }),
        );

        json!({
            "type": "object",
            "properties": properties,
            "required": ["symbol"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args = self.context.market_args(&call)?;
        let max_records: i64 =
            call.get_parameter_or("max_records", i64::from(self.context.defaults.max_records))?;

        let envelope = get_historical_data(&self.context, &args, max_records).await;
        ToolResult::json(call.id, envelope.to_value())
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "Last 50 hourly candles for BTCUSDT".to_string(),
            parameters: json!({
                "symbol": "BTCUSDT",
                "exchange": "BINANCE",
                "timeframe": "1h",
                "max_records": 50
            }),
            expected_result: "Envelope with records_collected and the candle list".to_string(),
        }]
    }
}

impl_tool_factory!(
    GetHistoricalDataToolFactory,
    GetHistoricalDataTool,
    GET_HISTORICAL_DATA
);

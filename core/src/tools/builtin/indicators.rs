//! Technical indicator tools

use crate::error::Result;
use crate::impl_tool_factory;
use crate::market::{catalog, export, IndicatorRequest, Timeframe};
use crate::tools::filter::filter_indicators;
use crate::tools::{Envelope, MarketArgs, Tool, ToolCall, ToolContext, ToolExample, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

pub const GET_INDICATORS: &str = "get_indicators";
pub const GET_SPECIFIC_INDICATORS: &str = "get_specific_indicators";

/// Fetch indicators for one symbol and wrap them in an envelope.
///
/// Never fails: any error becomes a `success: false` envelope.
pub async fn get_indicators(context: &ToolContext, args: &MarketArgs, all_indicators: bool) -> Envelope {
    info!(
        symbol = %args.symbol,
        exchange = %args.exchange,
        timeframe = %args.timeframe,
        "Fetching indicators"
    );

    let columns = if all_indicators {
        catalog::all_indicators()
    } else {
        catalog::recommendation_indicators()
    };

    let result = async {
        let indicators = scrape(context, args, columns).await?;
        let mut envelope =
            Envelope::indicators(&args.symbol, &args.exchange, &args.timeframe, indicators);
        if args.export_result {
            let path = export_indicators(context, args, &envelope).await?;
            envelope = envelope.with_export_file(path);
        }
        Ok::<_, crate::error::Error>(envelope)
    }
    .await;

    finish(args, result)
}

/// Fetch every indicator, then keep the keys matching `requested`
pub async fn get_specific_indicators(
    context: &ToolContext,
    args: &MarketArgs,
    requested: Vec<String>,
) -> Envelope {
    info!(
        symbol = %args.symbol,
        exchange = %args.exchange,
        timeframe = %args.timeframe,
        requested = ?requested,
        "Fetching specific indicators"
    );

    let result = async {
        // The scanner has no server-side name matching, so pull everything.
        let all = scrape(context, args, catalog::all_indicators()).await?;
        let filtered = filter_indicators(&all, &requested);
        let mut envelope =
            Envelope::indicators(&args.symbol, &args.exchange, &args.timeframe, filtered)
                .with_requested(requested.clone());
        if args.export_result {
            let path = export_indicators(context, args, &envelope).await?;
            envelope = envelope.with_export_file(path);
        }
        Ok::<_, crate::error::Error>(envelope)
    }
    .await;

    finish(args, result)
}

async fn scrape(
    context: &ToolContext,
    args: &MarketArgs,
    columns: Vec<String>,
) -> Result<crate::market::IndicatorMap> {
    let timeframe: Timeframe = args.timeframe.parse()?;
    let request = IndicatorRequest {
        exchange: args.exchange.clone(),
        symbol: args.symbol.clone(),
        timeframe,
        indicators: columns,
    };
    context.market.scrape(&request).await
}

async fn export_indicators(
    context: &ToolContext,
    args: &MarketArgs,
    envelope: &Envelope,
) -> Result<String> {
    let indicators = envelope.indicators.clone().unwrap_or_default();
    let path = export::write_json(&context.export_dir, "indicators", &args.symbol, &indicators).await?;
    Ok(path.display().to_string())
}

fn finish(args: &MarketArgs, result: Result<Envelope>) -> Envelope {
    match result {
        Ok(envelope) => {
            let count = envelope.indicators.as_ref().map_or(0, |m| m.len());
            info!(symbol = %args.symbol, count, "Fetched indicators");
            envelope
        }
        Err(e) => {
            error!(symbol = %args.symbol, error = %e, "Error fetching indicators");
            Envelope::failure(
                &args.symbol,
                &args.exchange,
                Some(&args.timeframe),
                e.to_string(),
            )
        }
    }
}

/// Tool returning every technical indicator for a symbol
pub struct GetIndicatorsTool {
    context: Arc<ToolContext>,
}

impl GetIndicatorsTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for GetIndicatorsTool {
    fn name(&self) -> &str {
        GET_INDICATORS
    }

    fn description(&self) -> &str {
        "Retrieve technical indicators for a given symbol from TradingView.\n\
         \n\
         Returns oscillators (RSI, Stochastic, CCI, ADX, MACD, ...), moving averages \
         (EMA/SMA 10-200, VWMA, HullMA9, Ichimoku), pivot points and the summary \
         recommendations. With all_indicators=false only the recommendation ratings \
         are returned."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = self.context.common_properties();
        properties.insert(
            "all_indicators".to_string(),
            json!({
                "type": "boolean",
                "description": "Whether to fetch all indicators (default: true)",
                "default": true
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
        let all_indicators: bool = call.get_parameter_or("all_indicators", true)?;

        let envelope = get_indicators(&self.context, &args, all_indicators).await;
        ToolResult::json(call.id, envelope.to_value())
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "All indicators for BTCUSD on the 4 hour chart".to_string(),
            parameters: json!({
                "symbol": "BTCUSD",
                "exchange": "BINANCE",
                "timeframe": "4h"
            }),
            expected_result: "Envelope with every indicator value".to_string(),
        }]
    }
}

/// Tool returning only the indicators whose names match the request
pub struct GetSpecificIndicatorsTool {
    context: Arc<ToolContext>,
}

impl GetSpecificIndicatorsTool {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for GetSpecificIndicatorsTool {
    fn name(&self) -> &str {
        GET_SPECIFIC_INDICATORS
    }

    fn description(&self) -> &str {
        "Retrieve specific technical indicators for a given symbol.\n\
         \n\
         Indicator names are matched case-insensitively as substrings of the \
         TradingView column names, so \"RSI\" also returns \"RSI[1]\" and \"Stoch.RSI.K\".\n\
         Available indicators include:\n\
         - Moving Averages: EMA10, EMA20, EMA50, EMA100, EMA200, SMA10, SMA20, SMA50, \
         SMA100, SMA200, HullMA9, VWMA\n\
         - Momentum: RSI, Stoch.K, Stoch.D, Stoch.RSI.K, CCI20, Mom, UO, W.R\n\
         - Trend: ADX, ADX+DI, ADX-DI, MACD.macd, MACD.signal, AO\n\
         - Other: BBPower, Ichimoku.BLine, close\n\
         - Pivot Points: Pivot.M.Classic.*, Pivot.M.Fibonacci.*, Pivot.M.Camarilla.*, ...\n\
         - Recommendations: Recommend.All, Recommend.MA, Recommend.Other"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = self.context.common_properties();
        properties.insert(
            "indicators".to_string(),
            json!({
                "type": "array",
                "items": {"type": "string"},
                "description": "Indicator names to fetch, e.g. [\"RSI\", \"MACD.macd\", \"EMA20\"]"
            }),
        );

        json!({
            "type": "object",
            "properties": properties,
            "required": ["symbol", "indicators"]
        })
    }

    async fn execute(&self, call: ToolCall) -> Result<ToolResult> {
        let args = self.context.market_args(&call)?;
        let requested: Vec<String> = call.get_parameter("indicators")?;

        let envelope = get_specific_indicators(&self.context, &args, requested).await;
        ToolResult::json(call.id, envelope.to_value())
    }

    fn examples(&self) -> Vec<ToolExample> {
        vec![ToolExample {
            description: "RSI and MACD for AAPL on the daily chart".to_string(),
            parameters: json!({
                "symbol": "AAPL",
                "indicators": ["RSI", "MACD"],
                "exchange": "NASDAQ",
                "timeframe": "1d"
            }),
            expected_result: "Envelope with the matching indicators only".to_string(),
        }]
    }
}

impl_tool_factory!(
    GetIndicatorsToolFactory,
    GetIndicatorsTool,
    GET_INDICATORS
);

impl_tool_factory!(
    GetSpecificIndicatorsToolFactory,
    GetSpecificIndicatorsTool,
    GET_SPECIFIC_INDICATORS
);

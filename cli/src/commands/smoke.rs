//! Live smoke checks against TradingView

use crate::config::CliConfigLoader;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tvmcp_core::tools::builtin::{get_indicators, get_specific_indicators};
use tvmcp_core::tools::{MarketArgs, ToolContext};
use tvmcp_core::{McpServer, TradingViewClient};

const RESOURCE_PREVIEW_CHARS: usize = 500;

/// Exercise both indicator tools and the resource with real requests
pub async fn smoke_command(config_loader: CliConfigLoader) -> Result<()> {
    info!("Running smoke checks");

    let config = config_loader.load().await?;
    let market = Arc::new(TradingViewClient::new(&config.tradingview)?);
    let context = ToolContext::new(market.clone(), &config);
    let server = McpServer::with_market(market, &config);

    println!("🧪 Testing TradingView MCP Server\n");

    // Check 1: all indicators
    println!("📋 Check 1: Getting all indicators for BTCUSD...");
    let args = MarketArgs {
        symbol: "BTCUSD".to_string(),
        exchange: "BINANCE".to_string(),
        timeframe: "4h".to_string(),
        export_result: false,
    };
    let envelope = get_indicators(&context, &args, true).await;
    match &envelope.indicators {
        Some(indicators) if envelope.success => {
            println!("   ✅ Retrieved {} indicators", indicators.len());
            let sample: Vec<&str> = indicators.keys().take(5).map(|k| k.as_str()).collect();
            println!("   Sample indicators: {}", sample.join(", "));
        }
        _ => println!("   ❌ Failed: {}", envelope.error.as_deref().unwrap_or("unknown error")),
    }

    println!("\n{}\n", "-".repeat(50));

    // Check 2: filtered indicators
    println!("🔎 Check 2: Getting specific indicators (RSI, MACD) for AAPL...");
    let args = MarketArgs {
        symbol: "AAPL".to_string(),
        exchange: "NASDAQ".to_string(),
        timeframe: "1d".to_string(),
        export_result: false,
    };
    let envelope =
        get_specific_indicators(&context, &args, vec!["RSI".to_string(), "MACD".to_string()]).await;
    match &envelope.indicators {
        Some(indicators) if envelope.success => {
            println!("   ✅ Retrieved {} matching indicators", indicators.len());
            for (key, value) in indicators {
                println!("     {}: {}", key, value);
            }
        }
        _ => println!("   ❌ Failed: {}", envelope.error.as_deref().unwrap_or("unknown error")),
    }

    println!("\n{}\n", "-".repeat(50));

    // Check 3: resource
    println!("📄 Check 3: Getting indicator resource for ETHUSD...");
    match server.resources().read("indicators/ETHUSD").await {
        Ok(contents) => {
            println!("   Resource output (first {} chars):", RESOURCE_PREVIEW_CHARS);
            let preview: String = contents.text.chars().take(RESOURCE_PREVIEW_CHARS).collect();
            if contents.text.chars().count() > RESOURCE_PREVIEW_CHARS {
                println!("{}...", preview);
            } else {
                println!("{}", preview);
            }
        }
        Err(e) => println!("   ❌ Failed: {}", e),
    }

    println!("\n🎉 Smoke checks completed!");

    Ok(())
}

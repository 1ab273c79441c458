//! End-to-end MCP session over an in-memory pipe

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tvmcp_core::config::ServerConfig;
use tvmcp_core::market::{
    Candle, CandleRequest, CandleSeries, IndicatorMap, IndicatorRequest, MarketDataSource,
};
use tvmcp_core::{McpServer, Result};

struct FixedMarket;

#[async_trait]
impl MarketDataSource for FixedMarket {
    async fn scrape(&self, request: &IndicatorRequest) -> Result<IndicatorMap> {
        Ok(request
            .indicators
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), json!(i as f64 + 0.5)))
            .collect())
    }

    async fn stream(&self, request: &CandleRequest) -> Result<CandleSeries> {
        let ohlc = (0..u64::from(request.max_records))
            .map(|i| Candle {
                index: i,
                timestamp: 1_700_000_000.0,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 0.0,
            })
            .collect();
        Ok(CandleSeries { ohlc })
    }
}

#[tokio::test]
async fn test_full_session() {
    let (client, server_io) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server_io);

    let server = McpServer::with_market(Arc::new(FixedMarket), &ServerConfig::default());
    let handle = tokio::spawn(async move {
        server
            .serve(BufReader::new(server_read), server_write)
            .await
    });

    let (client_read, mut client_write) = tokio::io::split(client);
    let mut responses = BufReader::new(client_read).lines();

    let requests = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
               "params": {"protocolVersion": "2025-03-26", "capabilities": {},
                          "clientInfo": {"name": "test", "version": "0"}}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "get_historical_data",
                          "arguments": {"symbol": "ETHUSDT", "max_records": 4}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "get_specific_indicators",
                          "arguments": {"symbol": "AAPL", "exchange": "NASDAQ",
                                        "timeframe": "1d", "indicators": ["rsi"]}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "get_indicators",
                          "arguments": {"symbol": "BTCUSD", "timeframe": "7h"}}}),
    ];

    for request in &requests {
        client_write
            .write_all(format!("{}\n", request).as_bytes())
            .await
            .unwrap();
    }
    client_write.shutdown().await.unwrap();

    let mut replies = Vec::new();
    while let Some(line) = responses.next_line().await.unwrap() {
        replies.push(serde_json::from_str::<Value>(&line).unwrap());
    }
    handle.await.unwrap().unwrap();

    assert_eq!(replies.len(), 4, "notification must not be answered");
    assert_eq!(replies[0]["result"]["protocolVersion"], json!("2025-03-26"));

    let history = &replies[1]["result"]["structuredContent"];
    assert_eq!(history["success"], json!(true));
    assert_eq!(history["exchange"], json!("BINANCE"));
    assert_eq!(history["records_collected"], json!(4));

    let specific = &replies[2]["result"]["structuredContent"];
    assert_eq!(specific["requested_indicators"], json!(["rsi"]));
    let keys: Vec<&String> = specific["indicators"].as_object().unwrap().keys().collect();
    assert!(keys.iter().any(|k| k.as_str() == "RSI"));
    assert!(keys.iter().all(|k| k.to_lowercase().contains("rsi")));

    let invalid = &replies[3]["result"]["structuredContent"];
    assert_eq!(invalid["success"], json!(false));
    assert_eq!(invalid["timeframe"], json!("7h"));
    assert!(invalid["error"].as_str().unwrap().contains("7h"));
}

//! TradingView chart feed client for OHLCV candles

use super::frame::{self, Frame};
use super::{Candle, CandleRequest, CandleSeries};
use crate::config::TradingViewConfig;
use crate::error::{Result, ScraperError};
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

/// Series identifiers used inside one chart session
const SERIES_ID: &str = "sds_1";
const SYMBOL_ID: &str = "sds_sym_1";

/// Upper bound TradingView serves to unauthenticated sessions
pub const MAX_CANDLES: u32 = 5000;

const QUOTE_FIELDS: &[&str] = &[
    "ch",
    "chp",
    "current_session",
    "description",
    "exchange",
    "lp",
    "lp_time",
    "original_name",
    "pricescale",
    "pro_name",
    "short_name",
    "type",
    "update_mode",
    "volume",
    "currency_code",
];

/// WebSocket client for the chart feed
#[derive(Debug, Clone)]
pub struct ChartStreamer {
    websocket_url: String,
    origin: String,
    user_agent: String,
    timeout: Duration,
}

impl ChartStreamer {
    /// Create a new streamer
    pub fn new(config: &TradingViewConfig) -> Self {
        Self {
            websocket_url: config.websocket_url.clone(),
            origin: config.origin.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.stream_timeout_secs),
        }
    }

    /// Open a chart session and collect up to `max_records` candles
    pub async fn stream(&self, request: &CandleRequest) -> Result<CandleSeries> {
        if request.symbol.trim().is_empty() || request.exchange.trim().is_empty() {
            return Err(ScraperError::InvalidRequest {
                message: "symbol and exchange must not be empty".to_string(),
            }
            .into());
        }
        if request.max_records == 0 || request.max_records > MAX_CANDLES {
            return Err(ScraperError::InvalidRequest {
                message: format!(
                    "max_records must be between 1 and {}, got {}",
                    MAX_CANDLES, request.max_records
                ),
            }
            .into());
        }

        tokio::time::timeout(self.timeout, self.run_session(request)).await?
    }

    async fn run_session(&self, request: &CandleRequest) -> Result<CandleSeries> {
        let mut ws_request = self.websocket_url.as_str().into_client_request()?;
        let headers = ws_request.headers_mut();
        headers.insert("Origin", header_value(&self.origin)?);
        headers.insert("User-Agent", header_value(&self.user_agent)?);

        let (mut socket, _) = connect_async(ws_request).await?;
        debug!(url = %self.websocket_url, ticker = %request.ticker(), "Chart feed connected");

        let chart_session = session_id("cs");
        let quote_session = session_id("qs");
        for message in handshake(request, &chart_session, &quote_session) {
            socket.send(Message::Text(message)).await?;
        }

        let mut collector = CandleCollector::new(request.max_records as usize);

        while let Some(message) = socket.next().await {
            let text = match message? {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            for decoded in frame::decode(&text)? {
                match &decoded {
                    Frame::Heartbeat(beat) => {
                        debug!(%beat, "Echoing heartbeat");
                        socket.send(Message::Text(frame::encode_raw(beat))).await?;
                    }
                    Frame::Message(_) => {
                        if collector.handle(&decoded)? {
                            let _ = socket.close(None).await;
                            return Ok(collector.finish());
                        }
                    }
                    Frame::Text(_) => {}
                }
            }
        }

        Err(ScraperError::StreamClosed {
            received: collector.len(),
        }
        .into())
    }
}

/// Messages that open a quote session and a single candle series
pub fn handshake(request: &CandleRequest, chart_session: &str, quote_session: &str) -> Vec<String> {
    let ticker = request.ticker();
    let symbol_spec = json!({ "adjustment": "splits", "symbol": ticker }).to_string();

    let mut quote_fields = vec![json!(quote_session)];
    quote_fields.extend(QUOTE_FIELDS.iter().map(|f| json!(f)));

    vec![
        frame::encode_call("set_auth_token", vec![json!("unauthorized_user_token")]),
        frame::encode_call("chart_create_session", vec![json!(chart_session), json!("")]),
        frame::encode_call("quote_create_session", vec![json!(quote_session)]),
        frame::encode_call("quote_set_fields", quote_fields),
        frame::encode_call("quote_add_symbols", vec![json!(quote_session), json!(ticker)]),
        frame::encode_call(
            "resolve_symbol",
            vec![
                json!(chart_session),
                json!(SYMBOL_ID),
                json!(format!("={}", symbol_spec)),
            ],
        ),
        frame::encode_call(
            "create_series",
            vec![
                json!(chart_session),
                json!(SERIES_ID),
                json!("s1"),
                json!(SYMBOL_ID),
                json!(request.timeframe.chart_resolution()),
                json!(request.max_records),
            ],
        ),
    ]
}

/// `cs_`/`qs_` prefix followed by 12 random lowercase letters
pub fn session_id(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..12)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect();
    format!("{}_{}", prefix, suffix)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| {
        ScraperError::InvalidRequest {
            message: format!("invalid header value '{}': {}", value, e),
        }
        .into()
    })
}

/// Accumulates candles from chart feed messages
#[derive(Debug)]
pub struct CandleCollector {
    max_records: usize,
    candles: BTreeMap<u64, Candle>,
}

impl CandleCollector {
    pub fn new(max_records: usize) -> Self {
        Self {
            max_records,
            candles: BTreeMap::new(),
        }
    }

    /// Number of distinct candles held
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Feed one frame; returns `true` once the series is complete
    pub fn handle(&mut self, frame: &Frame) -> Result<bool> {
        let Some(method) = frame.method() else {
            return Ok(false);
        };

        match method {
            "timescale_update" | "du" => {
                if let Some(points) = frame
                    .params()
                    .and_then(|p| p.get(1))
                    .and_then(|data| data.get(SERIES_ID))
                    .and_then(|series| series.get("s"))
                    .and_then(Value::as_array)
                {
                    for point in points {
                        match parse_candle(point) {
                            Some(candle) => {
                                self.candles.insert(candle.index, candle);
                            }
                            None => warn!(%point, "Skipping malformed candle"),
                        }
                    }
                }
                Ok(self.candles.len() >= self.max_records)
            }
            "series_completed" => Ok(true),
            "symbol_error" | "series_error" | "protocol_error" | "critical_error" => {
                let message = frame
                    .params()
                    .map(|p| Value::Array(p.clone()).to_string())
                    .unwrap_or_default();
                Err(ScraperError::Remote {
                    kind: method.to_string(),
                    message,
                }
                .into())
            }
            _ => Ok(false),
        }
    }

    /// The most recent `max_records` candles ordered by index
    pub fn finish(self) -> CandleSeries {
        let skip = self.candles.len().saturating_sub(self.max_records);
        CandleSeries {
            ohlc: self.candles.into_values().skip(skip).collect(),
        }
    }
}

fn parse_candle(point: &Value) -> Option<Candle> {
    let index = point.get("i")?.as_u64()?;
    let v = point.get("v")?.as_array()?;
    let num = |i: usize| v.get(i).and_then(Value::as_f64);

    Some(Candle {
        index,
        timestamp: num(0)?,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        // Some instruments carry no volume column.
        volume: num(5).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Timeframe;

    fn update(method: &str, points: Value) -> Frame {
        Frame::Message(json!({
            "m": method,
            "p": ["cs_test", { "sds_1": { "s": points } }]
        }))
    }

    fn point(i: u64, close: f64) -> Value {
        json!({ "i": i, "v": [1_700_000_000.0 + i as f64 * 3600.0, 1.0, 2.0, 0.5, close, 10.0] })
    }

    #[test]
    fn test_session_id_shape() {
        let id = session_id("cs");
        assert!(id.starts_with("cs_"));
        assert_eq!(id.len(), 15);
        assert!(id[3..].chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_handshake_creates_series_with_bound() {
        let request = CandleRequest {
            exchange: "BINANCE".to_string(),
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::FourHours,
            max_records: 50,
        };
        let messages = handshake(&request, "cs_a", "qs_b");
        let last = frame::decode(messages.last().unwrap()).unwrap();
        assert_eq!(last[0].method(), Some("create_series"));
        let params = last[0].params().unwrap();
        assert_eq!(params[4], json!("240"));
        assert_eq!(params[5], json!(50));

        let resolve = frame::decode(&messages[5]).unwrap();
        assert_eq!(resolve[0].method(), Some("resolve_symbol"));
        assert!(resolve[0].params().unwrap()[2]
            .as_str()
            .unwrap()
            .contains("BINANCE:BTCUSDT"));
    }

    #[test]
    fn test_collector_dedups_and_orders() {
        let mut collector = CandleCollector::new(10);
        assert!(!collector
            .handle(&update("timescale_update", json!([point(2, 3.0), point(1, 2.0)])))
            .unwrap());
        assert!(!collector.handle(&update("du", json!([point(2, 4.0)]))).unwrap());
        assert!(collector
            .handle(&Frame::Message(json!({"m": "series_completed", "p": []})))
            .unwrap());

        let series = collector.finish();
        assert_eq!(series.ohlc.len(), 2);
        assert_eq!(series.ohlc[0].index, 1);
        assert_eq!(series.ohlc[1].close, 4.0);
    }

    #[test]
    fn test_collector_stops_at_bound_and_keeps_latest() {
        let mut collector = CandleCollector::new(2);
        let done = collector
            .handle(&update(
                "timescale_update",
                json!([point(0, 1.0), point(1, 2.0), point(2, 3.0)]),
            ))
            .unwrap();
        assert!(done);
        let series = collector.finish();
        let indexes: Vec<_> = series.ohlc.iter().map(|c| c.index).collect();
        assert_eq!(indexes, vec![1, 2]);
    }

    #[test]
    fn test_collector_surfaces_remote_errors() {
        let mut collector = CandleCollector::new(5);
        let err = collector
            .handle(&Frame::Message(
                json!({"m": "symbol_error", "p": ["cs_x", "sds_sym_1", "invalid symbol"]}),
            ))
            .unwrap_err();
        assert!(err.to_string().contains("symbol_error"));
        assert!(err.to_string().contains("invalid symbol"));
    }

    #[test]
    fn test_missing_volume_defaults_to_zero() {
        let candle = parse_candle(&json!({"i": 0, "v": [1.0, 2.0, 3.0, 0.5, 2.5]})).unwrap();
        assert_eq!(candle.volume, 0.0);
        assert!(parse_candle(&json!({"i": 0, "v": [1.0]})).is_none());
    }
}

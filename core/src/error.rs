//! Error types and handling for tvmcp core

use thiserror::Error;

/// Result type alias for tvmcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tvmcp core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Market data retrieval errors
    #[error("{0}")]
    Scraper(#[from] ScraperError),

    /// Tool execution errors
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// MCP protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Errors raised while talking to TradingView
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Unsupported timeframe '{value}'. Supported timeframes: {supported}")]
    InvalidTimeframe { value: String, supported: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Symbol not found: {exchange}:{symbol}")]
    SymbolNotFound { exchange: String, symbol: String },

    #[error("TradingView returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Unexpected response from TradingView: {message}")]
    UnexpectedResponse { message: String },

    #[error("Malformed frame: {message}")]
    MalformedFrame { message: String },

    #[error("TradingView reported {kind}: {message}")]
    Remote { kind: String, message: String },

    #[error("Stream closed after {received} candles before the series completed")]
    StreamClosed { received: usize },
}

/// Tool execution errors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {name}")]
    NotFound { name: String },

    #[error("Invalid tool parameters: {message}")]
    InvalidParameters { message: String },
}

/// MCP protocol errors, each mapping onto a JSON-RPC error code
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Method not found: {method}")]
    MethodNotFound { method: String },

    #[error("Invalid params: {message}")]
    InvalidParams { message: String },

    #[error("Resource not found: {uri}")]
    ResourceNotFound { uri: String },
}

impl ProtocolError {
    /// JSON-RPC error code for this error
    pub fn code(&self) -> i64 {
        match self {
            ProtocolError::Parse { .. } => -32700,
            ProtocolError::InvalidRequest { .. } => -32600,
            ProtocolError::MethodNotFound { .. } => -32601,
            ProtocolError::InvalidParams { .. } => -32602,
            ProtocolError::ResourceNotFound { .. } => -32002,
        }
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}

//! # tvmcp Core
//!
//! Core library for tvmcp - an MCP server exposing TradingView technical
//! indicators and OHLCV history.
//!
//! The library provides the market data client, the tools and resources built
//! on top of it, and the line-delimited JSON-RPC server that publishes them.

// Core modules
pub mod config;
pub mod error;
pub mod market;
pub mod resources;
pub mod server;
pub mod tools;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{Error, Result};
pub use market::{MarketDataSource, TradingViewClient};
pub use server::McpServer;

/// Current version of the tvmcp-core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing with a specific debug mode; `RUST_LOG` still wins when set.
///
/// Logs go to stderr so stdout stays reserved for protocol messages.
pub fn init_tracing_with_debug(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Minimal configuration module for tvmcp core
//!
//! Only exports pure data types. All loading logic is in CLI layer.

pub mod types;

pub use types::{ServerConfig, ToolDefaults, TradingViewConfig, DEFAULT_SERVER_NAME};

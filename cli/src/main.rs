//! # tvmcp CLI
//!
//! Command-line interface for tvmcp - an MCP server exposing TradingView
//! technical indicators and OHLCV history.
//!
//! ## Usage
//!
//! - `tvmcp` / `tvmcp serve` - Serve MCP requests on stdio
//! - `tvmcp tools` - Show available tools and resource templates
//! - `tvmcp call <tool> --args '<json>'` - Invoke one tool
//! - `tvmcp resource <uri>` - Read one resource
//! - `tvmcp smoke` - Run live checks against TradingView
//!
//! Logs always go to stderr; stdout belongs to the protocol in serve mode.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{call_command, resource_command, serve_command, smoke_command, tools_command};
use config::CliConfigLoader;

/// tvmcp - TradingView indicators over the Model Context Protocol
#[derive(Parser)]
#[command(name = "tvmcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MCP server exposing TradingView indicators and OHLCV data")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file or directory path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default exchange override
    #[arg(long)]
    exchange: Option<String>,

    /// Default timeframe override
    #[arg(long)]
    timeframe: Option<String>,

    /// Export directory override
    #[arg(long)]
    export_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP requests on stdin/stdout (default)
    Serve,

    /// Show available tools and resource templates
    Tools,

    /// Invoke a single tool and print the result
    Call {
        /// Tool name, e.g. get_indicators
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },

    /// Read a resource, e.g. indicators/BTCUSD
    Resource {
        /// Resource URI
        uri: String,
    },

    /// Run live smoke checks against TradingView
    Smoke,
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> CliConfigLoader {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(config_path.clone());
    }

    if let Some(exchange) = &cli.exchange {
        loader = loader.with_exchange_override(exchange.clone());
    }

    if let Some(timeframe) = &cli.timeframe {
        loader = loader.with_timeframe_override(timeframe.clone());
    }

    if let Some(export_dir) = &cli.export_dir {
        loader = loader.with_export_dir_override(export_dir.clone());
    }

    loader
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing on stderr
    tvmcp_core::init_tracing_with_debug(cli.verbose);

    let config_loader = build_config_loader(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve_command(config_loader).await,
        Commands::Tools => tools_command(config_loader).await,
        Commands::Call { tool, args } => call_command(config_loader, tool, args).await,
        Commands::Resource { uri } => resource_command(config_loader, uri).await,
        Commands::Smoke => smoke_command(config_loader).await,
    }
}

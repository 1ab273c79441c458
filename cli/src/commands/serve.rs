//! Stdio server command

use crate::config::CliConfigLoader;
use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::info;
use tvmcp_core::McpServer;

/// Serve MCP requests on stdin/stdout until stdin closes
pub async fn serve_command(config_loader: CliConfigLoader) -> Result<()> {
    let config = config_loader.load().await?;
    info!(
        exchange = %config.defaults.exchange,
        timeframe = %config.defaults.timeframe,
        export_dir = %config.export_dir.display(),
        "Starting {}",
        config.server_name
    );

    let server = McpServer::from_config(&config).context("Failed to build server")?;
    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Server loop failed")?;

    Ok(())
}

//! Single tool invocation command

use crate::config::CliConfigLoader;
use anyhow::{anyhow, Context, Result};
use tracing::info;
use tvmcp_core::tools::ToolCall;
use tvmcp_core::McpServer;

/// Invoke one tool and print its result
pub async fn call_command(
    config_loader: CliConfigLoader,
    tool: String,
    args: Option<String>,
) -> Result<()> {
    let arguments: serde_json::Value = match args {
        Some(raw) => serde_json::from_str(&raw).context("--args must be a JSON object")?,
        None => serde_json::json!({}),
    };
    if !arguments.is_object() {
        return Err(anyhow!("--args must be a JSON object"));
    }

    let config = config_loader.load().await?;
    let server = McpServer::from_config(&config)?;

    info!(tool = %tool, "Calling tool");
    let result = server.tools().execute(ToolCall::new(tool, arguments)).await?;

    println!("{}", result.content);

    if !result.success {
        return Err(anyhow!("Tool call failed"));
    }
    Ok(())
}

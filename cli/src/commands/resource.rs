//! Resource read command

use crate::config::CliConfigLoader;
use anyhow::Result;
use tvmcp_core::McpServer;

/// Read one resource URI and print its text
pub async fn resource_command(config_loader: CliConfigLoader, uri: String) -> Result<()> {
    let config = config_loader.load().await?;
    let server = McpServer::from_config(&config)?;

    let contents = server.resources().read(&uri).await?;
    println!("{}", contents.text);

    Ok(())
}

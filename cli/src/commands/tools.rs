//! Tools listing command

use crate::config::CliConfigLoader;
use anyhow::Result;
use tracing::info;
use tvmcp_core::McpServer;

/// Show available tools and resource templates
pub async fn tools_command(config_loader: CliConfigLoader) -> Result<()> {
    info!("Listing available tools");

    let config = config_loader.load().await?;
    let server = McpServer::from_config(&config)?;

    println!("🛠️  Available Tools\n");

    for definition in server.tools().get_tool_definitions() {
        println!("📦 {}", definition.name);
        // Show first line of description only for brevity
        let first_line = definition
            .description
            .lines()
            .next()
            .unwrap_or(&definition.description);
        println!("   {}\n", first_line);
    }

    println!("📚 Resource Templates\n");

    for template in server.resources().templates() {
        println!("🔗 {} ({})", template.uri_template, template.mime_type);
        println!("   {}\n", template.description);
    }

    println!(
        "💡 Defaults: exchange {}, timeframe {}",
        config.defaults.exchange, config.defaults.timeframe
    );

    Ok(())
}

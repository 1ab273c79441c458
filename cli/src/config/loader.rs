//! CLI configuration loader for tvmcp
//!
//! Implements single-source priority loading with env and flag overrides:
//! 1. --config file/dir (highest priority)
//! 2. Current working directory: ./tvmcp.json or ./.tvmcp/config.json
//! 3. XDG config: $XDG_CONFIG_HOME/tvmcp/config.json or ~/.config/tvmcp/config.json
//! 4. Built-in defaults (no files)
//!
//! `TVMCP_EXCHANGE`, `TVMCP_TIMEFRAME` and `TVMCP_EXPORT_DIR` are applied on
//! top of the file, and flags on top of those.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tvmcp_core::ServerConfig;

pub const ENV_EXCHANGE: &str = "TVMCP_EXCHANGE";
pub const ENV_TIMEFRAME: &str = "TVMCP_TIMEFRAME";
pub const ENV_EXPORT_DIR: &str = "TVMCP_EXPORT_DIR";

/// Raw configuration file format; every field is optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    pub server_name: Option<String>,
    #[serde(default)]
    pub defaults: RawDefaults,
    #[serde(default)]
    pub tradingview: RawTradingView,
    /// Export directory, `~` is expanded
    pub export_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDefaults {
    pub exchange: Option<String>,
    pub timeframe: Option<String>,
    pub max_records: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTradingView {
    pub scanner_url: Option<String>,
    pub websocket_url: Option<String>,
    pub origin: Option<String>,
    pub user_agent: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub stream_timeout_secs: Option<u64>,
}

/// CLI configuration loader
pub struct CliConfigLoader {
    /// Override config file/directory path
    config_override: Option<PathBuf>,
    /// Flag overrides
    exchange_override: Option<String>,
    timeframe_override: Option<String>,
    export_dir_override: Option<String>,
}

impl CliConfigLoader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            config_override: None,
            exchange_override: None,
            timeframe_override: None,
            export_dir_override: None,
        }
    }

    /// Set config file/directory override
    pub fn with_config_override(mut self, path: PathBuf) -> Self {
        self.config_override = Some(path);
        self
    }

    /// Set default exchange override
    pub fn with_exchange_override(mut self, exchange: String) -> Self {
        self.exchange_override = Some(exchange);
        self
    }

    /// Set default timeframe override
    pub fn with_timeframe_override(mut self, timeframe: String) -> Self {
        self.timeframe_override = Some(timeframe);
        self
    }

    /// Set export directory override
    pub fn with_export_dir_override(mut self, export_dir: String) -> Self {
        self.export_dir_override = Some(export_dir);
        self
    }

    /// Load and resolve configuration
    pub async fn load(&self) -> Result<ServerConfig> {
        // Step 1: Find and load base configuration
        let mut config = if let Some(override_path) = &self.config_override {
            self.load_from_path(override_path).await.with_context(|| {
                format!(
                    "Failed to load config from override path: {}",
                    override_path.display()
                )
            })?
        } else {
            self.search_and_load().await?
        };

        // Step 2: Environment overrides
        if let Ok(exchange) = std::env::var(ENV_EXCHANGE) {
            config.defaults.exchange = Some(exchange);
        }
        if let Ok(timeframe) = std::env::var(ENV_TIMEFRAME) {
            config.defaults.timeframe = Some(timeframe);
        }
        if let Ok(export_dir) = std::env::var(ENV_EXPORT_DIR) {
            config.export_dir = Some(export_dir);
        }

        // Step 3: Flag overrides
        if let Some(exchange) = &self.exchange_override {
            config.defaults.exchange = Some(exchange.clone());
        }
        if let Some(timeframe) = &self.timeframe_override {
            config.defaults.timeframe = Some(timeframe.clone());
        }
        if let Some(export_dir) = &self.export_dir_override {
            config.export_dir = Some(export_dir.clone());
        }

        resolve_config(config)
    }

    /// Search for config in priority order
    async fn search_and_load(&self) -> Result<RawConfig> {
        // 1. Current working directory
        if let Some(config) = self.try_load_cwd().await? {
            return Ok(config);
        }

        // 2. XDG config directory
        if let Some(config) = self.try_load_xdg().await? {
            return Ok(config);
        }

        // 3. Defaults only
        Ok(RawConfig::default())
    }

    /// Try loading from current working directory
    async fn try_load_cwd(&self) -> Result<Option<RawConfig>> {
        let cwd = std::env::current_dir()?;

        let tvmcp_json = cwd.join("tvmcp.json");
        if tvmcp_json.exists() {
            return Ok(Some(self.load_file(&tvmcp_json).await?));
        }

        let tvmcp_dir_config = cwd.join(".tvmcp").join("config.json");
        if tvmcp_dir_config.exists() {
            return Ok(Some(self.load_file(&tvmcp_dir_config).await?));
        }

        Ok(None)
    }

    /// Try loading from XDG config directory
    async fn try_load_xdg(&self) -> Result<Option<RawConfig>> {
        if let Some(config_dir) = get_xdg_config_dir() {
            let config_path = config_dir.join("tvmcp").join("config.json");
            if config_path.exists() {
                return Ok(Some(self.load_file(&config_path).await?));
            }
        }
        Ok(None)
    }

    /// Load configuration from a specific path (file or directory)
    async fn load_from_path(&self, path: &Path) -> Result<RawConfig> {
        if path.is_file() {
            self.load_file(path).await
        } else if path.is_dir() {
            let config_file = path.join("config.json");
            if config_file.exists() {
                self.load_file(&config_file).await
            } else {
                Err(anyhow!(
                    "No config.json found in directory: {}",
                    path.display()
                ))
            }
        } else {
            Err(anyhow!("Config path does not exist: {}", path.display()))
        }
    }

    /// Load a single config file
    async fn load_file(&self, path: &Path) -> Result<RawConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

impl Default for CliConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// `$XDG_CONFIG_HOME`, falling back to the platform config directory
fn get_xdg_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
}

/// Fill unset fields from the built-in defaults and validate
fn resolve_config(raw: RawConfig) -> Result<ServerConfig> {
    let mut config = ServerConfig::default();

    if let Some(name) = raw.server_name {
        config.server_name = name;
    }

    let defaults = raw.defaults;
    if let Some(exchange) = defaults.exchange {
        config.defaults.exchange = exchange;
    }
    if let Some(timeframe) = defaults.timeframe {
        config.defaults.timeframe = timeframe;
    }
    if let Some(max_records) = defaults.max_records {
        config.defaults.max_records = max_records;
    }

    let tv = raw.tradingview;
    if let Some(url) = tv.scanner_url {
        config.tradingview.scanner_url = url;
    }
    if let Some(url) = tv.websocket_url {
        config.tradingview.websocket_url = url;
    }
    if let Some(origin) = tv.origin {
        config.tradingview.origin = origin;
    }
    if let Some(user_agent) = tv.user_agent {
        config.tradingview.user_agent = user_agent;
    }
    if let Some(secs) = tv.request_timeout_secs {
        config.tradingview.request_timeout_secs = secs;
    }
    if let Some(secs) = tv.stream_timeout_secs {
        config.tradingview.stream_timeout_secs = secs;
    }

    if let Some(export_dir) = raw.export_dir {
        let expanded = shellexpand::tilde(&export_dir);
        config.export_dir = PathBuf::from(expanded.as_ref());
    }

    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults() {
        let config = resolve_config(RawConfig::default()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_resolve_partial_file() {
        let raw: RawConfig = serde_json::from_str(
            r#"{
                "server_name": "Desk",
                "defaults": {"exchange": "NASDAQ", "max_records": 250},
                "tradingview": {"stream_timeout_secs": 60}
            }"#,
        )
        .unwrap();
        let config = resolve_config(raw).unwrap();

        assert_eq!(config.server_name, "Desk");
        assert_eq!(config.defaults.exchange, "NASDAQ");
        assert_eq!(config.defaults.timeframe, "1h");
        assert_eq!(config.defaults.max_records, 250);
        assert_eq!(config.tradingview.stream_timeout_secs, 60);
    }

    #[test]
    fn test_invalid_timeframe_rejected() {
        let raw = RawConfig {
            defaults: RawDefaults {
                timeframe: Some("3h".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = resolve_config(raw).unwrap_err();
        assert!(err.to_string().contains("defaults.timeframe"));
    }

    #[test]
    fn test_export_dir_tilde_expanded() {
        let raw = RawConfig {
            export_dir: Some("~/tv-exports".to_string()),
            ..Default::default()
        };
        let config = resolve_config(raw).unwrap();
        assert!(!config.export_dir.to_string_lossy().starts_with('~'));
        assert!(config.export_dir.ends_with("tv-exports"));
    }

    #[tokio::test]
    async fn test_load_from_override_file_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tvmcp.json");
        std::fs::write(&path, r#"{"defaults": {"exchange": "NYSE", "timeframe": "1d"}}"#).unwrap();

        let config = CliConfigLoader::new()
            .with_config_override(path)
            .with_timeframe_override("4h".to_string())
            .load()
            .await
            .unwrap();

        assert_eq!(config.defaults.timeframe, "4h");
        if std::env::var(ENV_EXCHANGE).is_err() {
            assert_eq!(config.defaults.exchange, "NYSE");
        }
    }

    #[tokio::test]
    async fn test_load_from_directory_requires_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfigLoader::new()
            .with_config_override(dir.path().to_path_buf())
            .load()
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("No config.json found"));
    }
}

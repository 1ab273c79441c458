//! Opt-in JSON export of tool results

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write `value` as pretty JSON to `<dir>/<kind>_<symbol>_<timestamp>.json`
pub async fn write_json<T: Serialize>(
    dir: &Path,
    kind: &str,
    symbol: &str,
    value: &T,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let path = dir.join(export_file_name(kind, symbol, &timestamp.to_string()));

    let body = serde_json::to_string_pretty(value)?;
    tokio::fs::write(&path, body).await?;

    info!(path = %path.display(), "Exported result");
    Ok(path)
}

fn export_file_name(kind: &str, symbol: &str, timestamp: &str) -> String {
    let symbol: String = symbol
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}_{}.json", kind, symbol, timestamp)
}

//! Plain-text rendering of indicator envelopes
//!
//! Used by the `indicators/{symbol}` resource and the CLI.

use super::Envelope;
use serde_json::Value;

/// Width of the separator line under the report header
pub const SEPARATOR_WIDTH: usize = 50;

/// Render an indicator envelope as a text report
pub fn format_indicator_report(symbol: &str, envelope: &Envelope) -> String {
    if !envelope.success {
        return format!(
            "Error fetching indicators for {}: {}",
            symbol,
            envelope.error.as_deref().unwrap_or("unknown error")
        );
    }

    let mut output = format!("Technical Indicators for {}\n", symbol);
    output.push_str(&format!("Exchange: {}\n", envelope.exchange));
    output.push_str(&format!(
        "Timeframe: {}\n",
        envelope.timeframe.as_deref().unwrap_or("")
    ));
    output.push_str(&"-".repeat(SEPARATOR_WIDTH));
    output.push('\n');

    if let Some(indicators) = &envelope.indicators {
        for (key, value) in indicators {
            output.push_str(&format!("{}: {}\n", key, format_value(value)));
        }
    }

    output
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "n/a".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

//! `indicators/{symbol}` text report

use super::{Resource, UriParams};
use crate::error::{ProtocolError, Result};
use crate::tools::builtin::get_indicators;
use crate::tools::output_formatter::format_indicator_report;
use crate::tools::ToolContext;
use async_trait::async_trait;
use std::sync::Arc;

/// Indicator report for a symbol using the configured exchange and timeframe
pub struct IndicatorReportResource {
    context: Arc<ToolContext>,
}

impl IndicatorReportResource {
    pub fn new(context: Arc<ToolContext>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Resource for IndicatorReportResource {
    fn uri_template(&self) -> &str {
        "indicators/{symbol}"
    }

    fn name(&self) -> &str {
        "indicators"
    }

    fn description(&self) -> &str {
        "Formatted technical indicator report for a symbol on the default exchange and timeframe"
    }

    async fn read(&self, params: &UriParams) -> Result<String> {
        let symbol = params
            .get("symbol")
            .ok_or_else(|| ProtocolError::InvalidParams {
                message: "Missing symbol in resource URI".to_string(),
            })?;

        let args = self.context.default_args(symbol);
        let envelope = get_indicators(&self.context, &args, true).await;
        Ok(format_indicator_report(symbol, &envelope))
    }
}

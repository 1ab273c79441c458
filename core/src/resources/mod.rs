//! Resource endpoints addressed by URI template

pub mod indicators;

pub use indicators::IndicatorReportResource;

use crate::error::{ProtocolError, Result};
use crate::tools::ToolContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Variables captured from a URI by [`match_template`]
pub type UriParams = BTreeMap<String, String>;

/// A readable resource family
#[async_trait]
pub trait Resource: Send + Sync {
    /// Template such as `indicators/{symbol}`
    fn uri_template(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn mime_type(&self) -> &str {
        "text/plain"
    }

    /// Produce the text for a URI that matched the template
    async fn read(&self, params: &UriParams) -> Result<String>;
}

/// Template description as advertised by `resources/templates/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// One item of a `resources/read` reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Match `uri` against a template made of literal text and `{name}` segments.
///
/// A variable captures one non-empty path segment.
pub fn match_template(template: &str, uri: &str) -> Option<UriParams> {
    let template_parts: Vec<&str> = template.split('/').collect();
    let uri_parts: Vec<&str> = uri.split('/').collect();
    if template_parts.len() != uri_parts.len() {
        return None;
    }

    let mut params = UriParams::new();
    for (pattern, part) in template_parts.iter().zip(uri_parts) {
        match pattern
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(name) => {
                if part.is_empty() {
                    return None;
                }
                params.insert(name.to_string(), part.to_string());
            }
            None if *pattern == part => {}
            None => return None,
        }
    }
    Some(params)
}

/// Set of resources served by the MCP server
pub struct ResourceRegistry {
    resources: Vec<Box<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Registry holding the built-in resources
    pub fn with_builtin_resources(context: Arc<ToolContext>) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(IndicatorReportResource::new(context)));
        registry
    }

    pub fn register(&mut self, resource: Box<dyn Resource>) {
        self.resources.push(resource);
    }

    pub fn templates(&self) -> Vec<ResourceTemplate> {
        self.resources
            .iter()
            .map(|resource| ResourceTemplate {
                uri_template: resource.uri_template().to_string(),
                name: resource.name().to_string(),
                description: resource.description().to_string(),
                mime_type: resource.mime_type().to_string(),
            })
            .collect()
    }

    /// Read the first resource whose template matches `uri`
    pub async fn read(&self, uri: &str) -> Result<ResourceContents> {
        for resource in &self.resources {
            if let Some(params) = match_template(resource.uri_template(), uri) {
                let text = resource.read(&params).await?;
                return Ok(ResourceContents {
                    uri: uri.to_string(),
                    mime_type: resource.mime_type().to_string(),
                    text,
                });
            }
        }

        Err(ProtocolError::ResourceNotFound {
            uri: uri.to_string(),
        }
        .into())
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::error::Error;
    use crate::market::mock::MockMarketData;
    use serde_json::json;

    #[test]
    fn test_match_template() {
        let params = match_template("indicators/{symbol}", "indicators/ETHUSD").unwrap();
        assert_eq!(params["symbol"], "ETHUSD");

        assert!(match_template("indicators/{symbol}", "indicators/").is_none());
        assert!(match_template("indicators/{symbol}", "indicators/A/B").is_none());
        assert!(match_template("indicators/{symbol}", "ohlc/ETHUSD").is_none());
        assert!(match_template("indicators/{symbol}", "indicators").is_none());
    }

    #[tokio::test]
    async fn test_registry_read_and_templates() {
        let market = Arc::new(MockMarketData::with_indicators(json!({"RSI": 40.0})));
        let context = Arc::new(ToolContext::new(market, &ServerConfig::default()));
        let registry = ResourceRegistry::with_builtin_resources(context);

        let templates = registry.templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].uri_template, "indicators/{symbol}");
        assert_eq!(templates[0].mime_type, "text/plain");

        let contents = registry.read("indicators/ETHUSD").await.unwrap();
        assert_eq!(contents.uri, "indicators/ETHUSD");
        assert!(contents.text.starts_with("Technical Indicators for ETHUSD\n"));
        assert!(contents.text.contains("RSI: 40.0"));

        let err = registry.read("candles/ETHUSD").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::ResourceNotFound { .. })
        ));
    }
}

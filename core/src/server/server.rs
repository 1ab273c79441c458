//! MCP server speaking line-delimited JSON-RPC

use super::protocol::{negotiate_version, JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, JSONRPC_VERSION};
use crate::config::ServerConfig;
use crate::error::{Error, ProtocolError, Result, ToolError};
use crate::market::{SharedMarketData, TradingViewClient};
use crate::resources::ResourceRegistry;
use crate::tools::{ToolCall, ToolContext, ToolExecutor, ToolRegistry, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

/// Server exposing the market data tools and resources
pub struct McpServer {
    name: String,
    tools: ToolExecutor,
    resources: ResourceRegistry,
}

impl McpServer {
    /// Server backed by the live TradingView client
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let market = Arc::new(TradingViewClient::new(&config.tradingview)?);
        Ok(Self::with_market(market, config))
    }

    /// Server backed by any market data source
    pub fn with_market(market: SharedMarketData, config: &ServerConfig) -> Self {
        let context = Arc::new(ToolContext::new(market, config));
        Self {
            name: config.server_name.clone(),
            tools: ToolRegistry::with_builtin_tools(context.clone()).create_executor_with_all(),
            resources: ResourceRegistry::with_builtin_resources(context),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &ToolExecutor {
        &self.tools
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Read requests until EOF, writing one response line per request
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(server = %self.name, "MCP server listening on stdio");

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            // Invalid UTF-8 falls through to the JSON parser and gets -32700.
            let line = String::from_utf8_lossy(&buf);
            if let Some(response) = self.handle_line(&line).await {
                writer.write_all(response.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one raw line; `None` when nothing should be written back
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await?,
            Err(e) => {
                warn!(error = %e, "Unparsable message");
                JsonRpcResponse::from_protocol_error(
                    Value::Null,
                    &ProtocolError::Parse {
                        message: e.to_string(),
                    },
                )
            }
        };

        match serde_json::to_string(&response) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(error = %e, "Failed to serialize response");
                None
            }
        }
    }

    async fn handle_message(&self, message: Value) -> Option<JsonRpcResponse> {
        let id = message.get("id").cloned().unwrap_or(Value::Null);

        // Replies from the client carry no method; we never issue requests.
        if message.is_object()
            && message.get("method").is_none()
            && (message.get("result").is_some() || message.get("error").is_some())
        {
            return None;
        }

        let request = match serde_json::from_value::<JsonRpcRequest>(message) {
            Ok(request) if request.jsonrpc == JSONRPC_VERSION => request,
            Ok(request) => {
                return Some(invalid_request(
                    id,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                ))
            }
            Err(e) => return Some(invalid_request(id, e.to_string())),
        };

        debug!(method = %request.method, id = ?request.id, "Received message");

        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification");
            return None;
        };

        let response = match self.dispatch(&request.method, request.params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(Error::Protocol(e)) => {
                warn!(method = %request.method, error = %e, "Request failed");
                JsonRpcResponse::from_protocol_error(id, &e)
            }
            Err(e) => {
                warn!(method = %request.method, error = %e, "Internal error");
                JsonRpcResponse::failure(id, INTERNAL_ERROR, e.to_string())
            }
        };
        Some(response)
    }

    async fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value> {
        match method {
            "initialize" => Ok(self.initialize(params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.tools.get_tool_definitions() })),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => Ok(json!({ "resources": [] })),
            "resources/templates/list" => {
                Ok(json!({ "resourceTemplates": self.resources.templates() }))
            }
            "resources/read" => self.read_resource(params).await,
            _ => Err(ProtocolError::MethodNotFound {
                method: method.to_string(),
            }
            .into()),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = negotiate_version(requested);
        info!(requested = ?requested, version, "Client initialized session");

        json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false }
            },
            "serverInfo": {
                "name": self.name,
                "version": crate::VERSION
            }
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value> {
        let params = params.unwrap_or(Value::Null);
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_params("tools/call requires a string 'name'"))?;
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(args @ Value::Object(_)) => args.clone(),
            Some(_) => return Err(invalid_params("'arguments' must be an object").into()),
        };

        let call = ToolCall::new(name, arguments);
        let call_id = call.id.clone();
        let result = match self.tools.execute(call).await {
            Ok(result) => result,
            Err(Error::Tool(e @ ToolError::NotFound { .. })) => {
                ToolResult::error(call_id, e.to_string())
            }
            Err(e) => return Err(e),
        };

        Ok(tool_result_to_value(result))
    }

    async fn read_resource(&self, params: Option<Value>) -> Result<Value> {
        let uri = params
            .as_ref()
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| invalid_params("resources/read requires a string 'uri'"))?;

        let contents = self.resources.read(uri).await?;
        Ok(json!({ "contents": [contents] }))
    }
}

fn tool_result_to_value(result: ToolResult) -> Value {
    let mut value = json!({
        "content": [{ "type": "text", "text": result.content }],
        "isError": !result.success
    });
    if let Some(data) = result.data {
        value["structuredContent"] = data;
    }
    value
}

fn invalid_params(message: &str) -> ProtocolError {
    ProtocolError::InvalidParams {
        message: message.to_string(),
    }
}

fn invalid_request(id: Value, message: String) -> JsonRpcResponse {
    JsonRpcResponse::from_protocol_error(id, &ProtocolError::InvalidRequest { message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::mock::MockMarketData;

    fn server_with(market: MockMarketData) -> McpServer {
        McpServer::with_market(Arc::new(market), &ServerConfig::default())
    }

    async fn request(server: &McpServer, message: Value) -> Value {
        let line = server
            .handle_line(&message.to_string())
            .await
            .expect("expected a response");
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server_with(MockMarketData::default());
        let response = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
                   "params": {"protocolVersion": "2024-11-05", "capabilities": {}}}),
        )
        .await;

        let result = &response["result"];
        assert_eq!(response["id"], json!(1));
        assert_eq!(result["protocolVersion"], json!("2024-11-05"));
        assert_eq!(result["serverInfo"]["name"], json!("TradingView Indicators Server"));
        assert_eq!(result["capabilities"]["tools"]["listChanged"], json!(false));
        assert_eq!(result["capabilities"]["resources"]["subscribe"], json!(false));
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = server_with(MockMarketData::default());
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
        assert!(server.handle_line("   ").await.is_none());
        assert!(server
            .handle_line(r#"{"jsonrpc":"2.0","id":9,"result":{}}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_ping_and_lists() {
        let server = server_with(MockMarketData::default());

        let ping = request(&server, json!({"jsonrpc": "2.0", "id": "p", "method": "ping"})).await;
        assert_eq!(ping["result"], json!({}));

        let tools = request(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let names: Vec<&str> = tools["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["get_historical_data", "get_indicators", "get_specific_indicators"]
        );
        assert!(tools["result"]["tools"][0]["inputSchema"].is_object());

        let resources =
            request(&server, json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"})).await;
        assert_eq!(resources["result"], json!({"resources": []}));

        let templates = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/templates/list"}),
        )
        .await;
        assert_eq!(
            templates["result"]["resourceTemplates"][0]["uriTemplate"],
            json!("indicators/{symbol}")
        );
    }

    #[tokio::test]
    async fn test_tools_call() {
        let server = server_with(MockMarketData::with_indicators(json!({"RSI": 61.2})));
        let response = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call",
                   "params": {"name": "get_indicators", "arguments": {"symbol": "BTCUSD"}}}),
        )
        .await;

        let result = &response["result"];
        assert_eq!(result["isError"], json!(false));
        assert_eq!(result["structuredContent"]["success"], json!(true));
        assert_eq!(result["structuredContent"]["indicators"]["RSI"], json!(61.2));
        let text: Value =
            serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(text, result["structuredContent"]);
    }

    #[tokio::test]
    async fn test_tools_call_errors() {
        let server = server_with(MockMarketData::default());

        let unknown = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 6, "method": "tools/call",
                   "params": {"name": "bash", "arguments": {}}}),
        )
        .await;
        assert_eq!(unknown["result"]["isError"], json!(true));
        assert!(unknown["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Tool not found: bash"));

        let missing = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call",
                   "params": {"name": "get_indicators"}}),
        )
        .await;
        assert_eq!(missing["result"]["isError"], json!(true));

        let no_name = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {}}),
        )
        .await;
        assert_eq!(no_name["error"]["code"], json!(-32602));
    }

    #[tokio::test]
    async fn test_failure_envelope_is_not_an_error() {
        let server = server_with(MockMarketData::failing("down"));
        let response = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 9, "method": "tools/call",
                   "params": {"name": "get_historical_data", "arguments": {"symbol": "BTCUSD"}}}),
        )
        .await;
        assert_eq!(response["result"]["isError"], json!(false));
        assert_eq!(response["result"]["structuredContent"]["success"], json!(false));
    }

    #[tokio::test]
    async fn test_resource_read() {
        let server = server_with(MockMarketData::with_indicators(json!({"RSI": 50})));
        let response = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 10, "method": "resources/read",
                   "params": {"uri": "indicators/ETHUSD"}}),
        )
        .await;
        let contents = &response["result"]["contents"][0];
        assert_eq!(contents["uri"], json!("indicators/ETHUSD"));
        assert_eq!(contents["mimeType"], json!("text/plain"));
        assert!(contents["text"].as_str().unwrap().contains("RSI: 50"));

        let missing = request(
            &server,
            json!({"jsonrpc": "2.0", "id": 11, "method": "resources/read",
                   "params": {"uri": "nothing/here"}}),
        )
        .await;
        assert_eq!(missing["error"]["code"], json!(-32002));
    }

    #[tokio::test]
    async fn test_protocol_errors() {
        let server = server_with(MockMarketData::default());

        let parse: Value = serde_json::from_str(&server.handle_line("{not json").await.unwrap()).unwrap();
        assert_eq!(parse["error"]["code"], json!(-32700));
        assert_eq!(parse["id"], Value::Null);

        let invalid = request(&server, json!([1, 2, 3])).await;
        assert_eq!(invalid["error"]["code"], json!(-32600));

        let unknown = request(&server, json!({"jsonrpc": "2.0", "id": 12, "method": "sampling/x"})).await;
        assert_eq!(unknown["error"]["code"], json!(-32601));
        assert_eq!(unknown["id"], json!(12));
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let server = server_with(MockMarketData::default());
        let mut input: Vec<u8> = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#);
        input.push(b'\n');

        let mut output = Vec::new();
        server
            .serve(tokio::io::BufReader::new(input.as_slice()), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["error"]["code"], json!(-32700));
        assert_eq!(lines[0]["id"], Value::Null);
        assert_eq!(lines[1]["id"], json!(3));
        assert_eq!(lines[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_serve_until_eof() {
        let server = server_with(MockMarketData::default());
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n"
        );
        let mut output = Vec::new();
        server
            .serve(tokio::io::BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["result"]["protocolVersion"], json!("2025-06-18"));
        assert_eq!(lines[1]["id"], json!(2));
    }
}

//! MCP server over stdio

pub mod protocol;
#[allow(clippy::module_inception)]
pub mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, SUPPORTED_PROTOCOL_VERSIONS};
pub use server::McpServer;

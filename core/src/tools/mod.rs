//! Tool system and built-in tools

pub mod base;
pub mod builtin;
pub mod context;
pub mod envelope;
pub mod filter;
pub mod output_formatter;
pub mod registry;

pub use base::{Tool, ToolCall, ToolDefinition, ToolExample, ToolExecutor, ToolResult};
pub use context::{MarketArgs, ToolContext};
pub use envelope::Envelope;
pub use registry::{ToolFactory, ToolRegistry};

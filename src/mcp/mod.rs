pub mod client;
pub mod tools;
pub mod types;

pub use client::McpClient;
pub use tools::format_tools_for_llm;
pub use types::{McpTool, McpToolCall, McpToolResult};

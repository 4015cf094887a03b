//! The agent seam: whatever turns a conversation into a stream of reply snapshots.

mod vllm;

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use crate::error::{ChatError, Result};
use crate::mcp::{McpTool, McpToolCall};
use crate::models::Message;

pub use vllm::{call_limit_notice, truncated_notice, AgentSettings, VllmAgent};

/// Cumulative snapshots of the messages produced during one turn.
///
/// Each item holds every response message so far; the last item is the
/// complete reply (tool calls, tool results and the final answer).
pub type SnapshotStream<'a> = Pin<Box<dyn Stream<Item = Result<Vec<Message>>> + Send + 'a>>;

pub trait Agent: Send + Sync {
    fn run<'a>(&'a self, history: &'a [Message]) -> SnapshotStream<'a>;
}

/// Source of callable tools for an agent.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn list_tools(&self) -> Vec<McpTool>;

    /// Returns the tool's text output.
    async fn call_tool(&self, call: &McpToolCall) -> Result<String>;
}

/// Provider with no tools, used when every tool group is disabled.
pub struct NoTools;

#[async_trait]
impl ToolProvider for NoTools {
    async fn list_tools(&self) -> Vec<McpTool> {
        Vec::new()
    }

    async fn call_tool(&self, call: &McpToolCall) -> Result<String> {
        Err(ChatError::Invocation(format!("Tool '{}' not found", call.name)))
    }
}

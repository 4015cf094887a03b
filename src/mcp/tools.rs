use super::types::McpTool;
use serde_json::{json, Value};

/// OpenAI `tools` entries for the given MCP tools.
pub fn format_tools_for_llm(tools: &[McpTool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description.as_deref().unwrap_or_default(),
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect()
}

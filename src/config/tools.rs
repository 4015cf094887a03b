use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::defaults::{default_max_llm_calls, default_tool_timeout};

/// Launch specification for one MCP tool group.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct McpServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>, // values may reference ${VAR}
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>, args: &[&str]) -> Self {
        Self {
            command: command.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            env: HashMap::new(),
            timeout_secs: default_tool_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_llm_calls")]
    pub max_llm_calls: usize,
    #[serde(default)]
    pub keep_tool_transcript: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_llm_calls: default_max_llm_calls(),
            keep_tool_transcript: false,
        }
    }
}

/// The tool groups used when the config file does not name any.
pub fn default_mcp_servers() -> BTreeMap<String, McpServerConfig> {
    let mut servers = BTreeMap::new();
    servers.insert(
        "korea_weather".to_string(),
        McpServerConfig::new("uv", &["run", "korea_weather.py"]),
    );
    servers
}

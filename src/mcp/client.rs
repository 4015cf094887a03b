use async_trait::async_trait;
use colored::*;
use jsonschema::JSONSchema;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::RwLock;
use tokio::time::{timeout, Duration};

use super::types::{InitializeResult, McpTool, McpToolCall, McpToolResult, ToolListResponse};
use crate::agent::ToolProvider;
use crate::config::{expand_env_vars, McpServerConfig};
use crate::error::{ChatError, Result};

// MCP Protocol constants
const MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const CLIENT_NAME: &str = "vllm-chat";
const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Client for MCP tool groups running as stdio subprocesses.
pub struct McpClient {
    servers: Arc<RwLock<HashMap<String, McpServer>>>,
    tools: Arc<RwLock<HashMap<String, (String, McpTool)>>>, // tool_name -> (server_name, tool)
    verbose: bool,
}

struct McpServer {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
    timeout_secs: u64,
}

impl McpServer {
    async fn send_request(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params.unwrap_or(json!({}))
        });
        self.write_line(&request).await?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line).await? == 0 {
                return Err(ChatError::Invocation(format!(
                    "MCP server closed the connection during '{}'",
                    method
                )));
            }
            if line.trim().is_empty() {
                continue;
            }

            // Servers may interleave notifications and log lines with responses.
            let Ok(response) = serde_json::from_str::<Value>(line.trim()) else {
                continue;
            };
            if response.get("id") != Some(&json!(id)) {
                continue;
            }
            if let Some(result) = response.get("result") {
                return Ok(result.clone());
            }
            if let Some(error) = response.get("error") {
                return Err(ChatError::Invocation(format!("MCP error: {}", error)));
            }
            return Err(ChatError::Invocation(format!(
                "MCP response to '{}' has neither result nor error",
                method
            )));
        }
    }

    async fn send_notification(&mut self, method: &str) -> Result<()> {
        let notification = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": {}
        });
        self.write_line(&notification).await
    }

    async fn write_line(&mut self, message: &Value) -> Result<()> {
        let mut payload = serde_json::to_string(message)?;
        payload.push('\n');
        self.stdin.write_all(payload.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn request_with_timeout(&mut self, method: &str, params: Option<Value>) -> Result<Value> {
        let limit = Duration::from_secs(self.timeout_secs);
        match timeout(limit, self.send_request(method, params)).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::Invocation(format!(
                "MCP request '{}' timed out after {} seconds",
                method, self.timeout_secs
            ))),
        }
    }
}

impl McpClient {
    pub fn new(verbose: bool) -> Self {
        Self {
            servers: Arc::new(RwLock::new(HashMap::new())),
            tools: Arc::new(RwLock::new(HashMap::new())),
            verbose,
        }
    }

    /// Start every configured tool group; groups that fail are reported and skipped.
    pub async fn connect_all(
        &self,
        servers: &BTreeMap<String, McpServerConfig>,
    ) -> Vec<(String, ChatError)> {
        let mut failures = Vec::new();
        for (name, config) in servers {
            if let Err(e) = self.connect_server(name, config).await {
                failures.push((name.clone(), e));
            }
        }
        failures
    }

    pub async fn connect_server(&self, server_name: &str, config: &McpServerConfig) -> Result<()> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        // Values are not logged, they often carry API keys.
        for (key, value) in expand_env_vars(&config.env) {
            if self.verbose {
                eprintln!("{}", format!("[mcp] {}: setting env var {}", server_name, key).dimmed());
            }
            cmd.env(key, value);
        }

        let mut process = cmd.spawn().map_err(|e| {
            ChatError::Invocation(format!("failed to start '{}': {}", config.command, e))
        })?;
        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| ChatError::Invocation("MCP server stdin unavailable".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| ChatError::Invocation("MCP server stdout unavailable".to_string()))?;

        let mut server = McpServer {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
            timeout_secs: config.timeout_secs,
        };

        let init_params = json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": CLIENT_VERSION
            }
        });

        let response = server.request_with_timeout("initialize", Some(init_params)).await?;
        let init_result: InitializeResult = serde_json::from_value(response)
            .map_err(|e| ChatError::Invocation(format!("invalid initialize result: {}", e)))?;

        if self.verbose {
            eprintln!(
                "{}",
                format!(
                    "[mcp] Connected to {}: {} v{} (protocol {})",
                    server_name,
                    init_result.server_info.name,
                    init_result.server_info.version,
                    init_result.protocol_version
                )
                .dimmed()
            );
        }

        server.send_notification("notifications/initialized").await?;

        let response = server.request_with_timeout("tools/list", None).await?;
        let tool_list: ToolListResponse = serde_json::from_value(response)
            .map_err(|e| ChatError::Invocation(format!("invalid tools/list result: {}", e)))?;

        {
            let mut servers = self.servers.write().await;
            servers.insert(server_name.to_string(), server);
        }

        let mut tools = self.tools.write().await;
        tools.retain(|_, (srv_name, _)| srv_name != server_name);
        for tool in tool_list.tools {
            if self.verbose {
                eprintln!(
                    "{}",
                    format!(
                        "[mcp]   - Tool: {} - {}",
                        tool.name,
                        tool.description.as_deref().unwrap_or_default()
                    )
                    .dimmed()
                );
            }
            tools.insert(tool.name.clone(), (server_name.to_string(), tool));
        }

        Ok(())
    }

    pub async fn server_names(&self) -> Vec<String> {
        let servers = self.servers.read().await;
        let mut names: Vec<String> = servers.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn call(&self, tool_call: &McpToolCall) -> Result<McpToolResult> {
        let (server_name, tool) = {
            let tools = self.tools.read().await;
            tools
                .get(&tool_call.name)
                .cloned()
                .ok_or_else(|| ChatError::Invocation(format!("Tool '{}' not found", tool_call.name)))?
        };

        if let Err(validation_errors) = validate_tool_arguments(&tool, &tool_call.arguments) {
            return Err(ChatError::Invocation(format!(
                "Tool '{}' argument validation failed: {}",
                tool_call.name, validation_errors
            )));
        }

        let mut servers = self.servers.write().await;
        let server = servers
            .get_mut(&server_name)
            .ok_or_else(|| ChatError::Invocation(format!("Server '{}' not found", server_name)))?;

        let params = json!({
            "name": tool_call.name,
            "arguments": tool_call.arguments,
        });
        let response = server.request_with_timeout("tools/call", Some(params)).await?;
        serde_json::from_value(response)
            .map_err(|e| ChatError::Invocation(format!("invalid tools/call result: {}", e)))
    }

    pub async fn shutdown(&self) {
        let mut servers = self.servers.write().await;
        for (name, mut server) in servers.drain() {
            if let Err(e) = server.process.kill().await {
                if self.verbose {
                    eprintln!("{}", format!("[mcp] Failed to stop {}: {}", name, e).dimmed());
                }
            }
        }
        self.tools.write().await.clear();
    }
}

fn validate_tool_arguments(tool: &McpTool, arguments: &Value) -> std::result::Result<(), String> {
    let schema = match JSONSchema::compile(&tool.input_schema) {
        Ok(s) => s,
        Err(e) => return Err(format!("Invalid tool schema: {}", e)),
    };

    if let Err(errors) = schema.validate(arguments) {
        let error_messages: Vec<String> = errors
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect();
        return Err(error_messages.join("; "));
    }

    Ok(())
}

#[async_trait]
impl ToolProvider for McpClient {
    async fn list_tools(&self) -> Vec<McpTool> {
        let tools = self.tools.read().await;
        let mut list: Vec<McpTool> = tools.values().map(|(_, tool)| tool.clone()).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    async fn call_tool(&self, call: &McpToolCall) -> Result<String> {
        let result = self.call(call).await?;
        let text = result.text();
        if result.is_error == Some(true) {
            return Err(ChatError::Invocation(text));
        }
        Ok(text)
    }
}

use async_stream::try_stream;
use colored::*;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::{timeout, Duration};

use super::{Agent, SnapshotStream, ToolProvider};
use crate::api::{ApiClient, DeltaAccumulator, RequestBody, SseEvent, SseLineBuffer};
use crate::config::{Config, GenerateConfig};
use crate::error::{ChatError, Result};
use crate::mcp::{format_tools_for_llm, McpToolCall};
use crate::models::{Message, ToolCall};

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub system_prompt: String,
    pub generate: GenerateConfig,
    pub stream_timeout: u64,
    pub max_llm_calls: usize,
    pub verbose: bool,
}

impl From<&Config> for AgentSettings {
    fn from(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            generate: config.generate.clone(),
            stream_timeout: config.stream_timeout,
            max_llm_calls: config.max_llm_calls,
            verbose: config.verbose,
        }
    }
}

/// Tool-calling agent over a vLLM (OpenAI-compatible) chat completions endpoint.
pub struct VllmAgent {
    client: ApiClient,
    settings: AgentSettings,
    tools: Arc<dyn ToolProvider>,
}

impl VllmAgent {
    /// `max_llm_calls` below one is raised to one.
    pub fn new(client: ApiClient, mut settings: AgentSettings, tools: Arc<dyn ToolProvider>) -> Self {
        settings.max_llm_calls = settings.max_llm_calls.max(1);
        Self {
            client,
            settings,
            tools,
        }
    }

    pub fn from_config(config: &Config, tools: Arc<dyn ToolProvider>) -> Result<Self> {
        let client = ApiClient::new(&config.base_url, &config.api_key)?;
        Ok(Self::new(client, AgentSettings::from(config), tools))
    }

    fn request(&self, messages: Vec<Message>, tools: Option<Vec<Value>>) -> RequestBody {
        RequestBody {
            model: self.settings.model.clone(),
            messages,
            max_tokens: self.settings.generate.max_tokens,
            temperature: self.settings.generate.temperature,
            top_p: Some(self.settings.generate.top_p),
            stream: true,
            tools,
        }
    }

    fn debug(&self, message: String) {
        if self.settings.verbose {
            eprintln!("{}", format!("[agent] {}", message).dimmed());
        }
    }

    /// Run one tool call; failures become `Error: ...` text for the model to read.
    async fn invoke_tool(&self, call: &ToolCall) -> String {
        let name = &call.function.name;
        let arguments = match serde_json::from_str::<Value>(&call.function.arguments) {
            Ok(arguments) => arguments,
            Err(err) => {
                return format!("Error: failed to parse arguments for tool '{}': {}", name, err);
            }
        };

        self.debug(format!("Calling tool '{}' with args: {}", name, arguments));
        let tool_call = McpToolCall {
            name: name.clone(),
            arguments,
        };
        match self.tools.call_tool(&tool_call).await {
            Ok(text) => text,
            Err(err) => {
                self.debug(format!("Tool '{}' failed: {}", name, err));
                format!("Error: {}", err.message())
            }
        }
    }
}

/// Shown after an answer that hit the token limit.
pub fn truncated_notice(max_tokens: u32) -> String {
    format!("(reply truncated at {} tokens)", max_tokens)
}

/// Shown when the tool loop ends without a final answer.
pub fn call_limit_notice(calls: usize) -> String {
    format!("(stopped after {} model calls without a final answer)", calls)
}

impl Agent for VllmAgent {
    fn run<'a>(&'a self, history: &'a [Message]) -> SnapshotStream<'a> {
        Box::pin(self.snapshots(history))
    }
}

impl VllmAgent {
    fn snapshots<'a>(
        &'a self,
        history: &'a [Message],
    ) -> impl Stream<Item = Result<Vec<Message>>> + Send + 'a {
        try_stream! {
            let tool_specs = self.tools.list_tools().await;
            let tools = if tool_specs.is_empty() {
                None
            } else {
                Some(format_tools_for_llm(&tool_specs))
            };

            let mut conversation = Vec::with_capacity(history.len() + 1);
            conversation.push(Message::system(self.settings.system_prompt.clone()));
            conversation.extend_from_slice(history);

            let chunk_timeout = Duration::from_secs(self.settings.stream_timeout);
            let mut produced: Vec<Message> = Vec::new();

            for round in 1..=self.settings.max_llm_calls {
                let mut messages = conversation.clone();
                messages.extend(produced.iter().cloned());
                self.debug(format!(
                    "Round {}: sending {} messages to {}",
                    round,
                    messages.len(),
                    self.settings.model
                ));

                let response = self.client.chat_stream(&self.request(messages, tools.clone())).await?;
                let mut body = response.bytes_stream();
                let mut lines = SseLineBuffer::new();
                let mut acc = DeltaAccumulator::new();
                let mut yielded = false;
                let mut done = false;

                while !done {
                    let next = timeout(chunk_timeout, body.next()).await.map_err(|_| {
                        ChatError::Transport(format!(
                            "Connection timeout - no data received for {} seconds",
                            self.settings.stream_timeout
                        ))
                    })?;
                    let events = match next {
                        Some(chunk) => lines.push(&chunk?),
                        None => {
                            done = true;
                            lines.finish()
                        }
                    };

                    for event in events {
                        match event {
                            SseEvent::Done => done = true,
                            SseEvent::Data(data) => {
                                if acc.apply_data(&data)? {
                                    let mut snapshot = produced.clone();
                                    snapshot.push(acc.message());
                                    yielded = true;
                                    yield snapshot;
                                }
                            }
                            SseEvent::Field { name, value } => {
                                self.debug(format!("SSE {}: {}", name, value));
                            }
                        }
                    }
                }

                let calls = acc.tool_calls();
                produced.push(acc.message());
                if !yielded {
                    yield produced.clone();
                }
                if calls.is_empty() {
                    if acc.finish_reason() == Some("length") {
                        let max_tokens = self.settings.generate.max_tokens;
                        self.debug(format!("Reply cut at max_tokens={}", max_tokens));
                        produced.push(Message::assistant(truncated_notice(max_tokens)));
                        yield produced.clone();
                    }
                    break;
                }

                for call in &calls {
                    let result = self.invoke_tool(call).await;
                    produced.push(Message::tool_result(
                        call.id.clone(),
                        call.function.name.clone(),
                        result,
                    ));
                    yield produced.clone();
                }

                if round == self.settings.max_llm_calls {
                    self.debug(format!("Stopping after {} model calls", round));
                    produced.push(Message::assistant(call_limit_notice(round)));
                    yield produced.clone();
                }
            }
        }
    }
}

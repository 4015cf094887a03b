use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Message;

#[derive(Serialize, Debug, Clone)]
pub struct RequestBody {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

/// `GET /v1/models` response.
#[derive(Deserialize, Debug, Clone)]
pub struct ModelList {
    pub data: Vec<ModelCard>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ModelCard {
    pub id: String,
    #[serde(default)]
    pub max_model_len: Option<u64>,
}

/// Non-streaming `POST /v1/chat/completions` response.
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletion {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionChoice {
    pub message: Message,
}

#[derive(Deserialize, Debug, Default)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "reasoning")]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// Fragment of a tool call; `index` ties fragments of the same call together.
#[derive(Deserialize, Debug, Default)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Choice {
    pub delta: Option<Delta>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One `data:` payload. vLLM reports mid-stream failures as
/// `{"object": "error", "message": ...}`; OpenAI-style servers use `{"error": ...}`.
#[derive(Deserialize, Debug)]
pub struct StreamResponse {
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl StreamResponse {
    /// The server's error message when this payload reports a failure.
    pub fn error_message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            let message = match error {
                Value::String(text) => text.clone(),
                Value::Object(fields) => fields
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string()),
                other => other.to_string(),
            };
            return Some(message);
        }
        if self.object.as_deref() == Some("error") {
            return Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| "server reported an error".to_string()),
            );
        }
        None
    }
}

//! Smoke tests for the inference server's HTTP API.
//!
//! Every check prints its own diagnostics and reports a plain pass/fail; errors
//! never escape a check.

use colored::*;
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

use crate::api::response::{extract_content, extract_reasoning};
use crate::api::{ApiClient, ModelCard, RequestBody};
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::models::Message;

pub const LISTING_TIMEOUT: Duration = Duration::from_secs(5);
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

pub const GREETING_PROMPT: &str = "안녕하세요! 간단한 인사말을 해주세요.";
pub const WEATHER_PROMPT: &str = "서울 날씨 알려줘";
pub const WEATHER_SYSTEM_PROMPT: &str = "당신은 한국 날씨 정보를 제공하는 AI 어시스턴트입니다. 사용자가 날씨 정보를 요청하면 korea_weather MCP 서버의 도구들을 사용하여 날씨 정보를 조회합니다.";
pub const VLLM_SERVE_HINT: &str =
    "vllm serve Qwen/Qwen3-8B --enable-reasoning --reasoning-parser deepseek_r1 --tensor-parallel-size 4";

const PROBE_TEMPERATURE: f32 = 0.7;

pub struct Prober {
    client: ApiClient,
    model: String,
}

fn emit<W: Write>(out: &mut W, line: impl Display) {
    // Write errors on the console are ignored.
    let _ = writeln!(out, "{}", line);
}

impl Prober {
    pub fn new(client: ApiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = ApiClient::new(&config.base_url, &config.api_key)?;
        Ok(Self::new(client, config.model.clone()))
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Fetch the model listing without printing anything.
    pub async fn list_models(&self) -> Result<Vec<ModelCard>> {
        Ok(self.client.list_models(LISTING_TIMEOUT).await?.data)
    }

    pub async fn check_connection<W: Write>(&self, out: &mut W) -> bool {
        match self.list_models().await {
            Ok(models) => {
                emit(out, "✅ Connected to vLLM server".green());
                for model in &models {
                    emit(out, format!("   - model: {}", model.id));
                    let max_len = model
                        .max_model_len
                        .map(|len| len.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    emit(out, format!("   - max length: {}", max_len));
                }
                true
            }
            Err(e) => {
                emit(out, format!("❌ vLLM server connection failed: {}", e.message()).red());
                false
            }
        }
    }

    pub async fn check_chat<W: Write>(&self, out: &mut W) -> bool {
        let request = self.chat_request(vec![Message::user(GREETING_PROMPT)], 100);
        self.run_chat_check(out, "Chat test", &request, true).await
    }

    /// Verifies the server accepts a tool-aware system prompt. No tool is invoked.
    pub async fn check_weather_query<W: Write>(&self, out: &mut W) -> bool {
        let request = self.chat_request(
            vec![
                Message::system(WEATHER_SYSTEM_PROMPT),
                Message::user(WEATHER_PROMPT),
            ],
            200,
        );
        self.run_chat_check(out, "Weather query test", &request, false).await
    }

    /// Run all checks in order, stopping at the first failure.
    pub async fn run_all<W: Write>(&self, out: &mut W) -> bool {
        emit(out, "=== vLLM + MCP smoke test ===\n".bold());

        emit(out, format!("1. Testing vLLM server connection ({})...", self.base_url()));
        if !self.check_connection(out).await {
            emit(out, "Start the vLLM server with:");
            emit(out, VLLM_SERVE_HINT);
            return false;
        }

        emit(out, "\n2. Testing chat completion...");
        if !self.check_chat(out).await {
            emit(out, "The chat completion endpoint is not working.");
            return false;
        }

        emit(out, "\n3. Testing weather query...");
        if !self.check_weather_query(out).await {
            emit(out, "The weather prompt was not handled.");
            return false;
        }

        emit(out, "\n🎉 All tests passed!".green().bold());
        emit(out, "Now start the chat front-end to try the whole system:");
        emit(out, "vllm-chat");
        true
    }

    fn chat_request(&self, messages: Vec<Message>, max_tokens: u32) -> RequestBody {
        RequestBody {
            model: self.model.clone(),
            messages,
            max_tokens,
            temperature: PROBE_TEMPERATURE,
            top_p: None,
            stream: false,
            tools: None,
        }
    }

    async fn run_chat_check<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        request: &RequestBody,
        show_reasoning: bool,
    ) -> bool {
        let outcome = async {
            let completion = self.client.chat(request, CHAT_TIMEOUT).await?;
            let content = extract_content(&completion)?
                .ok_or_else(|| ChatError::Transport("empty response content".to_string()))?;
            let reasoning = extract_reasoning(&completion)?;
            Ok::<_, ChatError>((content, reasoning))
        }
        .await;

        match outcome {
            Ok((content, reasoning)) => {
                emit(out, format!("✅ {} passed", label).green());
                emit(out, format!("Response: {}", content));
                if show_reasoning {
                    if let Some(reasoning) = reasoning {
                        emit(out, "✅ Reasoning enabled".green());
                        emit(out, format!("Reasoning: {}", reasoning));
                    }
                }
                true
            }
            Err(e) => {
                emit(out, format!("❌ {} failed: {}", label, e.message()).red());
                false
            }
        }
    }
}

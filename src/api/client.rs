use crate::api::models::{ChatCompletion, ModelList, RequestBody};
use crate::error::{ChatError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// HTTP client for an OpenAI-compatible inference server.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8000`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| ChatError::Config(format!("Invalid authorization header: {}", e)))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: crate::config::normalize_base_url(base_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn models_url(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    pub async fn list_models(&self, timeout: Duration) -> Result<ModelList> {
        let response = self
            .http
            .get(self.models_url())
            .timeout(timeout)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn chat(&self, request: &RequestBody, timeout: Duration) -> Result<ChatCompletion> {
        let response = self
            .http
            .post(self.chat_url())
            .timeout(timeout)
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Start a streaming completion; the caller consumes the SSE body.
    pub async fn chat_stream(&self, request: &RequestBody) -> Result<reqwest::Response> {
        let response = self
            .http
            .post(self.chat_url())
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;
        ensure_success(response).await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let error_text = response.text().await.unwrap_or_default();
    Err(ChatError::http_status(status, &error_text))
}

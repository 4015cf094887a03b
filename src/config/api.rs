use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub stream_timeout: Option<u64>,
}

/// Reduce any accepted server address to its root, without `/v1`.
///
/// `http://localhost:8000`, `http://localhost:8000/`, `http://localhost:8000/v1`
/// and `http://localhost:8000/v1/` all normalise to `http://localhost:8000`.
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

mod api;
mod defaults;
mod generate;
mod tools;
mod validation;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{normalize_base_url, ServerConfig};
pub use defaults::{DEFAULT_API_KEY, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use generate::GenerateConfig;
pub use tools::{default_mcp_servers, AgentConfig, McpServerConfig};
pub use validation::{expand_env_var_in_string, expand_env_vars, expand_with};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

/// Contents of a `.vllm-chat.yaml` (or `.json`) file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    /// `None` keeps the built-in tool groups; an empty map disables them.
    #[serde(default)]
    pub mcp_servers: Option<BTreeMap<String, McpServerConfig>>,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Values taken from the command line, highest priority.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
    pub no_tools: bool,
    pub full_transcript: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server root without the `/v1` suffix.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
    pub generate: GenerateConfig,
    pub stream_timeout: u64,
    pub max_llm_calls: usize,
    pub keep_tool_transcript: bool,
    pub mcp_servers: BTreeMap<String, McpServerConfig>,
    pub verbose: bool,
}

impl Config {
    /// Resolve configuration from the CLI, the process environment and the first config file found.
    pub fn load(overrides: &CliOverrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => FileConfig::load_from(path)?,
            None => FileConfig::load()?,
        };
        Ok(Self::resolve(file, |name| env::var(name).ok(), overrides))
    }

    /// Priority: CLI overrides > environment > config file > defaults.
    pub fn resolve<F>(file: FileConfig, lookup: F, overrides: &CliOverrides) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| lookup("VLLM_BASE_URL"))
            .or(file.server.base_url)
            .map(|url| normalize_base_url(&url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = lookup("VLLM_API_KEY")
            .or(file.server.api_key)
            .unwrap_or_else(|| DEFAULT_API_KEY.to_string());

        let model = overrides
            .model
            .clone()
            .or_else(|| lookup("VLLM_MODEL"))
            .or(file.model.name)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let system_prompt = lookup("VLLM_SYSTEM_PROMPT")
            .or(file.model.system_prompt)
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let stream_timeout = lookup("VLLM_STREAM_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .or(file.server.stream_timeout)
            .unwrap_or_else(defaults::default_stream_timeout);

        let verbose = overrides.verbose
            || lookup("AI_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(file.session.verbose)
                .unwrap_or(false);

        let mcp_servers = if overrides.no_tools {
            BTreeMap::new()
        } else {
            file.mcp_servers.unwrap_or_else(default_mcp_servers)
        };

        Config {
            base_url,
            api_key,
            model,
            system_prompt,
            generate: file.generate,
            stream_timeout,
            max_llm_calls: file.agent.max_llm_calls.max(1),
            keep_tool_transcript: overrides.full_transcript || file.agent.keep_tool_transcript,
            mcp_servers,
            verbose,
        }
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))
        }
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".vllm-chat.yaml"),
            PathBuf::from(".vllm-chat.yml"),
            PathBuf::from(".vllm-chat.json"),
        ];

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("vllm-chat");
            paths.push(config_dir.join("vllm-chat.yaml"));
            paths.push(config_dir.join("vllm-chat.yml"));
            paths.push(config_dir.join("vllm-chat.json"));
        }

        paths
    }
}

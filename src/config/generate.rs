use serde::{Deserialize, Serialize};

use super::defaults::{default_max_tokens, default_temperature, default_top_p};

/// Sampling parameters sent with every agent request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerateConfig {
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            top_p: default_top_p(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

//! LLM configuration from TOML (`[llm]` section)

use panel_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw chat-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub endpoint: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Model used for query analysis
    pub model: Model,
    /// Model used by panel members; falls back to `model`
    pub panel_model: Option<Model>,
    pub temperature: f32,
}

impl Default for FileLlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: Model::default(),
            panel_model: None,
            temperature: 0.2,
        }
    }
}

impl FileLlmConfig {
    pub fn panel_model(&self) -> Model {
        self.panel_model.clone().unwrap_or_else(|| self.model.clone())
    }

    /// The API key read from `api_key_env`, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_model_falls_back() {
        let config = FileLlmConfig::default();
        assert_eq!(config.panel_model(), config.model);

        let config = FileLlmConfig {
            panel_model: Some(Model::Gpt41),
            ..FileLlmConfig::default()
        };
        assert_eq!(config.panel_model(), Model::Gpt41);
    }
}

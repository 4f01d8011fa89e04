//! OpenAI-compatible LLM Gateway implementation

use super::session::OpenAiSession;
use crate::config::FileLlmConfig;
use crate::error::{InfraError, Result};
use async_trait::async_trait;
use panel_application::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use panel_domain::Model;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Connection settings shared by every session of a gateway
#[derive(Clone)]
pub(super) struct Endpoint {
    pub(super) http: Client,
    pub(super) base_url: String,
    pub(super) api_key: String,
    pub(super) temperature: Option<f32>,
}

impl Endpoint {
    pub(super) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// LLM Gateway for any endpoint speaking the Chat Completions API
pub struct OpenAiLlmGateway {
    endpoint: Arc<Endpoint>,
}

impl OpenAiLlmGateway {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(endpoint = %base_url, "OpenAiLlmGateway initialized");

        Ok(Self {
            endpoint: Arc::new(Endpoint {
                http: builder.build()?,
                base_url,
                api_key: api_key.into(),
                temperature: None,
            }),
        })
    }

    /// Build a gateway from the `[llm]` section, reading the key from its environment variable.
    pub fn from_config(config: &FileLlmConfig, timeout: Option<Duration>) -> Result<Self> {
        let api_key = config.api_key().ok_or_else(|| {
            InfraError::MissingSetting(format!("environment variable {}", config.api_key_env))
        })?;
        Ok(Self::new(&config.endpoint, api_key, timeout)?.with_temperature(config.temperature))
    }

    /// Sampling temperature sent to non-reasoning models
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        Arc::make_mut(&mut self.endpoint).temperature = Some(temperature);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.endpoint.base_url
    }
}

impl std::fmt::Debug for OpenAiLlmGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiLlmGateway")
            .field("base_url", &self.endpoint.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl LlmGateway for OpenAiLlmGateway {
    async fn create_session(&self, model: &Model) -> std::result::Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            Arc::clone(&self.endpoint),
            model.clone(),
            None,
        )))
    }

    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> std::result::Result<Box<dyn LlmSession>, GatewayError> {
        Ok(Box::new(OpenAiSession::new(
            Arc::clone(&self.endpoint),
            model.clone(),
            Some(system_prompt.to_string()),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url() {
        let gateway = OpenAiLlmGateway::new("https://api.openai.com/v1/", "sk-test", None).unwrap();
        assert_eq!(gateway.base_url(), "https://api.openai.com/v1");
        assert_eq!(
            gateway.endpoint.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_with_temperature() {
        let gateway = OpenAiLlmGateway::new("http://localhost:8080/v1", "k", None)
            .unwrap()
            .with_temperature(0.4);
        assert_eq!(gateway.endpoint.temperature, Some(0.4));
    }

    #[test]
    fn test_debug_redacts_key() {
        let gateway = OpenAiLlmGateway::new("http://localhost:8080/v1", "sk-secret", None).unwrap();
        assert!(!format!("{:?}", gateway).contains("sk-secret"));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = FileLlmConfig {
            api_key_env: "PANEL_TEST_UNSET_OPENAI_KEY".to_string(),
            ..FileLlmConfig::default()
        };
        let err = OpenAiLlmGateway::from_config(&config, None).unwrap_err();
        assert!(matches!(err, InfraError::MissingSetting(_)));
    }

    #[tokio::test]
    async fn test_session_carries_model() {
        let gateway = OpenAiLlmGateway::new("http://localhost:8080/v1", "k", None).unwrap();
        let session = gateway
            .create_session_with_system_prompt(&Model::Gpt41, "You are a cardiologist.")
            .await
            .unwrap();
        assert_eq!(session.model(), &Model::Gpt41);
    }
}

//! One conversation with a chat-completion model

use super::gateway::Endpoint;
use super::types::{ApiError, CompletionRequest, CompletionResponse, Message};
use async_trait::async_trait;
use panel_application::ports::llm_gateway::{GatewayError, LlmSession};
use panel_domain::Model;
use reqwest::StatusCode;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Session holding the system prompt and the turns exchanged so far
pub struct OpenAiSession {
    endpoint: Arc<Endpoint>,
    model: Model,
    history: Mutex<Vec<Message>>,
}

impl OpenAiSession {
    pub(super) fn new(endpoint: Arc<Endpoint>, model: Model, system_prompt: Option<String>) -> Self {
        let history = system_prompt
            .filter(|p| !p.trim().is_empty())
            .map(Message::system)
            .into_iter()
            .collect();
        Self {
            endpoint,
            model,
            history: Mutex::new(history),
        }
    }

    fn snapshot(&self) -> Vec<Message> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

/// Build the request body; reasoning models reject `temperature`.
fn build_request(model: &Model, messages: Vec<Message>, temperature: Option<f32>) -> CompletionRequest {
    CompletionRequest {
        model: model.as_str().to_string(),
        messages,
        temperature: temperature.filter(|_| !model.is_reasoning()),
    }
}

/// First choice's content, or an invalid-response error.
fn extract_content(response: CompletionResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".to_string()))
}

fn map_status(status: StatusCode, body: &str, model: &Model) -> GatewayError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    match status {
        StatusCode::NOT_FOUND => GatewayError::ModelNotAvailable(model.to_string()),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ => GatewayError::RequestFailed(format!("{}: {}", status.as_u16(), message)),
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ConnectionError(e.to_string())
    } else {
        GatewayError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl LlmSession for OpenAiSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        let mut messages = self.snapshot();
        messages.push(Message::user(content));
        let body = build_request(&self.model, messages, self.endpoint.temperature);

        debug!(model = %self.model, bytes = content.len(), "Sending chat completion");
        let response = self
            .endpoint
            .http
            .post(self.endpoint.completions_url())
            .header("Authorization", format!("Bearer {}", self.endpoint.api_key))
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(map_status(status, &text, &self.model));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        let answer = extract_content(parsed)?;

        if let Ok(mut history) = self.history.lock() {
            history.push(Message::user(content));
            history.push(Message::assistant(answer.clone()));
        }
        Ok(answer)
    }
}

//! OpenAI-compatible chat completions adapter.
//!
//! Serves both api.openai.com and the OpenRouter gateway; the two differ only
//! in their default base URL.

use serde::Deserialize;
use serde_json::json;

use super::{decode_envelope, parse_command_text, system_prompt};
use super::{BackendRequest, Provider, ProviderConfig};
use crate::domain::{CommandOutput, GenerationRequest};
use crate::error::GenerationError;

/// Sampling temperature for command generation
const TEMPERATURE: f64 = 0.3;

/// Adapter for `POST {base}/chat/completions`
pub struct OpenAiAdapter {
    config: ProviderConfig,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let endpoint = format!("{}/chat/completions", config.resolved_base_url());
        Ok(Self { config, endpoint })
    }
}

impl Provider for OpenAiAdapter {
    fn id(&self) -> &str {
        self.config.provider.id()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, request: &GenerationRequest) -> BackendRequest {
        BackendRequest {
            url: self.endpoint.clone(),
            headers: vec![(
                "Authorization".to_string(),
                format!("Bearer {}", self.config.api_key),
            )],
            body: json!({
                "model": self.config.model,
                "messages": [
                    {"role": "system", "content": system_prompt(request.context())},
                    {"role": "user", "content": request.prompt()},
                ],
                "temperature": TEMPERATURE,
                "max_tokens": self.config.max_tokens,
            }),
        }
    }

    fn parse_response(&self, body: &str) -> Result<CommandOutput, GenerationError> {
        let completion: ChatCompletion = decode_envelope(self.id(), body)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Parse("Response has no choices".to_string()))?
            .message
            .content
            .ok_or_else(|| GenerationError::Parse("First choice has no message content".to_string()))?;

        Ok(parse_command_text(&content))
    }
}

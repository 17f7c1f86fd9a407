//! Anthropic messages API adapter.

use serde::Deserialize;
use serde_json::json;

use super::{decode_envelope, parse_command_text, system_prompt};
use super::{BackendRequest, Provider, ProviderConfig};
use crate::domain::{CommandOutput, GenerationRequest};
use crate::error::GenerationError;

/// API version pinned in the `anthropic-version` header
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Adapter for `POST {base}/messages`
pub struct AnthropicAdapter {
    config: ProviderConfig,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl AnthropicAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let endpoint = format!("{}/messages", config.resolved_base_url());
        Ok(Self { config, endpoint })
    }
}

impl Provider for AnthropicAdapter {
    fn id(&self) -> &str {
        self.config.provider.id()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, request: &GenerationRequest) -> BackendRequest {
        BackendRequest {
            url: self.endpoint.clone(),
            headers: vec![
                ("x-api-key".to_string(), self.config.api_key.clone()),
                ("anthropic-version".to_string(), ANTHROPIC_VERSION.to_string()),
            ],
            body: json!({
                "model": self.config.model,
                "max_tokens": self.config.max_tokens,
                "system": system_prompt(request.context()),
                "messages": [
                    {"role": "user", "content": request.prompt()},
                ],
            }),
        }
    }

    fn parse_response(&self, body: &str) -> Result<CommandOutput, GenerationError> {
        let response: MessagesResponse = decode_envelope(self.id(), body)?;
        let text = response
            .content
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::Parse("Response has no content blocks".to_string()))?
            .text
            .ok_or_else(|| GenerationError::Parse("First content block has no text".to_string()))?;

        Ok(parse_command_text(&text))
    }
}

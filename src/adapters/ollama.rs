//! Local Ollama adapter (no authentication, streaming disabled).

use serde::Deserialize;
use serde_json::json;

use super::{decode_envelope, parse_command_text, system_prompt};
use super::{BackendRequest, Provider, ProviderConfig};
use crate::domain::{CommandOutput, GenerationRequest};
use crate::error::GenerationError;

/// Adapter for `POST {base}/api/generate`
pub struct OllamaAdapter {
    config: ProviderConfig,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

impl OllamaAdapter {
    pub fn new(config: ProviderConfig) -> Result<Self, GenerationError> {
        config.validate()?;
        let endpoint = format!("{}/api/generate", config.resolved_base_url());
        Ok(Self { config, endpoint })
    }
}

impl Provider for OllamaAdapter {
    fn id(&self) -> &str {
        self.config.provider.id()
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn build_request(&self, request: &GenerationRequest) -> BackendRequest {
        let prompt = format!(
            "{}\n\nUser request: {}",
            system_prompt(request.context()),
            request.prompt()
        );

        BackendRequest {
            url: self.endpoint.clone(),
            headers: Vec::new(),
            body: json!({
                "model": self.config.model,
                "prompt": prompt,
                "stream": false,
            }),
        }
    }

    fn parse_response(&self, body: &str) -> Result<CommandOutput, GenerationError> {
        let response: GenerateResponse = decode_envelope(self.id(), body)?;
        let text = response
            .response
            .ok_or_else(|| GenerationError::Parse("Response has no 'response' field".to_string()))?;

        Ok(parse_command_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ProviderKind;

    fn adapter() -> OllamaAdapter {
        OllamaAdapter::new(ProviderConfig::new(ProviderKind::Ollama, "", "llama3.1")).unwrap()
    }

    #[test]
    fn test_build_request_single_prompt() {
        let request = GenerationRequest::new("count lines in main.rs", None).unwrap();
        let built = adapter().build_request(&request);

        assert_eq!(built.url, "http://localhost:11434/api/generate");
        assert!(built.headers.is_empty());
        assert_eq!(built.body["stream"], false);
        assert!(built.body["prompt"]
            .as_str()
            .unwrap()
            .ends_with("\n\nUser request: count lines in main.rs"));
    }

    #[test]
    fn test_parse_flat_response() {
        let body = r#"{"model":"llama3.1","response":"{\"command\":\"wc -l main.rs\"}","done":true}"#;
        let output = adapter().parse_response(body).unwrap();
        assert_eq!(output.command, "wc -l main.rs");
    }

    #[test]
    fn test_missing_response_field_is_parse_error() {
        let result = adapter().parse_response(r#"{"done":true}"#);
        assert!(matches!(result, Err(GenerationError::Parse(_))));
    }
}

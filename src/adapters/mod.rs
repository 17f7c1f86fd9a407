//! Provider adapters for LLM backends.
//!
//! Adapters translate between the normalized [`GenerationRequest`] /
//! [`CommandOutput`] shapes and one backend family's native protocol. The
//! HTTP call itself goes through a [`Transport`], so adapters stay pure
//! request builders and response parsers.

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod transport;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use crate::domain::{CommandOutput, GenerationRequest};
use crate::error::GenerationError;

pub use anthropic::AnthropicAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;
pub use prompt::{parse_command_text, system_prompt, FALLBACK_EXPLANATION};
pub use transport::{HttpTransport, Transport};

/// Default request timeout for backend calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default completion budget
pub const DEFAULT_MAX_TOKENS: u32 = 500;

/// Backend families, selected by `provider_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// api.openai.com chat completions
    OpenAi,
    /// OpenRouter gateway (OpenAI-compatible)
    OpenRouter,
    /// Anthropic messages API
    Anthropic,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// Canonical provider id
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Endpoint root used when no base URL is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    /// Whether the backend needs an API key
    pub fn requires_credential(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(GenerationError::Configuration(format!(
                "Unknown provider: {}",
                other
            ))),
        }
    }
}

/// Immutable settings for one backend.
///
/// Reconfiguration means building a new adapter from a new config.
#[derive(Clone)]
pub struct ProviderConfig {
    pub provider: ProviderKind,
    pub api_key: String,
    pub model: String,
    /// Overrides [`ProviderKind::default_base_url`] when set
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(provider: ProviderKind, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configured base URL or the provider default, without trailing slash
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Reject configs an adapter cannot work with, before any network call
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.model.trim().is_empty() {
            return Err(GenerationError::Configuration(format!(
                "No model configured for provider '{}'",
                self.provider
            )));
        }
        if self.provider.requires_credential() && self.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration(format!(
                "API key not configured for provider '{}'. Set SHELLAGENT_API_KEY or OPENROUTER_API_KEY",
                self.provider
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Mask a secret for display, keeping only its last four characters
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        return "<unset>".to_string();
    }
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

/// A backend-specific HTTP request, ready for a [`Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct BackendRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl BackendRequest {
    /// Look up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Trait for backend adapters
pub trait Provider: Send + Sync {
    /// Provider id this adapter was built for
    fn id(&self) -> &str;

    /// Model identifier sent to the backend
    fn model(&self) -> &str;

    /// Build the backend request for a prompt plus optional context
    fn build_request(&self, request: &GenerationRequest) -> BackendRequest;

    /// Extract the command (and explanation) from a raw response body
    fn parse_response(&self, body: &str) -> Result<CommandOutput, GenerationError>;
}

/// Build the adapter for a config, validating credentials up front
pub fn build_provider(config: ProviderConfig) -> Result<Box<dyn Provider>, GenerationError> {
    let provider: Box<dyn Provider> = match config.provider {
        ProviderKind::OpenAi | ProviderKind::OpenRouter => Box::new(OpenAiAdapter::new(config)?),
        ProviderKind::Anthropic => Box::new(AnthropicAdapter::new(config)?),
        ProviderKind::Ollama => Box::new(OllamaAdapter::new(config)?),
    };
    Ok(provider)
}

/// Run the build / call / parse sequence for one request
pub async fn invoke(
    provider: &dyn Provider,
    transport: &dyn Transport,
    request: &GenerationRequest,
) -> Result<CommandOutput, GenerationError> {
    let backend_request = provider.build_request(request);
    tracing::debug!(
        provider = provider.id(),
        model = provider.model(),
        url = %backend_request.url,
        "Sending backend request"
    );

    let body = transport.post_json(&backend_request).await?;
    provider.parse_response(&body)
}

/// Parse a response body into a typed envelope, mapping failures to Parse
pub(crate) fn decode_envelope<T: serde::de::DeserializeOwned>(
    provider: &str,
    body: &str,
) -> Result<T, GenerationError> {
    serde_json::from_str(body).map_err(|e| {
        GenerationError::Parse(format!("Malformed {} response: {}", provider, e))
    })
}
